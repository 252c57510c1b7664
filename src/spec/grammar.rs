use super::defs;
use derive_more::Display;
use enum_map::{Enum, EnumMap};
use once_cell::sync::Lazy;
use strum_macros::EnumIter;

static STORAGE: Lazy<Grammar> = Lazy::new(Grammar::new);

/// Operand kinds whose text is a `|`-joined set of flag names.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Enum, EnumIter)]
pub enum MaskCategory {
    #[display(fmt = "FP fast math mode")]
    FpFastMathMode,
    #[display(fmt = "selection control")]
    SelectionControl,
    #[display(fmt = "loop control")]
    LoopControl,
    #[display(fmt = "function control")]
    FunctionControl,
    #[display(fmt = "memory access")]
    MemoryAccess,
    #[display(fmt = "image operands")]
    ImageOperands,
    #[display(fmt = "kernel profiling info")]
    KernelProfilingInfo,
}

/// Operand kinds whose text is exactly one enumerant name.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Enum, EnumIter)]
pub enum ValueCategory {
    #[display(fmt = "sampler addressing mode")]
    SamplerAddressingMode,
    #[display(fmt = "sampler filter mode")]
    SamplerFilterMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumerant {
    pub name: &'static str,
    pub value: u32,
}

pub struct Grammar {
    masks: EnumMap<MaskCategory, Vec<Enumerant>>,
    values: EnumMap<ValueCategory, Vec<Enumerant>>,
}

impl Grammar {
    fn new() -> Self {
        let mut builder = Builder::new();
        defs::enumerant::register(&mut builder);
        builder.build()
    }

    pub fn get() -> &'static Grammar {
        Lazy::force(&STORAGE)
    }

    /// Enumerants of a mask category in declaration order.
    pub fn mask_enumerants(&self, category: MaskCategory) -> &[Enumerant] {
        &self.masks[category]
    }

    pub fn lookup_mask(&self, category: MaskCategory, name: &str) -> Option<u32> {
        find_value(&self.masks[category], name)
    }

    pub fn value_enumerants(&self, category: ValueCategory) -> &[Enumerant] {
        &self.values[category]
    }

    pub fn lookup_value(&self, category: ValueCategory, name: &str) -> Option<u32> {
        find_value(&self.values[category], name)
    }

    pub fn value_name(&self, category: ValueCategory, value: u32) -> Option<&'static str> {
        self.values[category]
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.name)
    }
}

// Names are case sensitive.
fn find_value(enumerants: &[Enumerant], name: &str) -> Option<u32> {
    enumerants.iter().find(|e| e.name == name).map(|e| e.value)
}

pub struct Builder {
    grammar: Grammar,
}

impl Builder {
    fn new() -> Self {
        Builder {
            grammar: Grammar {
                masks: EnumMap::new(),
                values: EnumMap::new(),
            },
        }
    }

    fn build(self) -> Grammar {
        self.grammar
    }

    pub(super) fn register_mask(&mut self, category: MaskCategory, name: &'static str, value: u32) {
        let enumerants = &mut self.grammar.masks[category];
        assert!(find_value(enumerants, name).is_none());
        // Anything but `None` names exactly one bit.
        assert!(value == 0 || value.is_power_of_two());
        enumerants.push(Enumerant { name, value });
    }

    pub(super) fn register_value(&mut self, category: ValueCategory, name: &'static str, value: u32) {
        let enumerants = &mut self.grammar.values[category];
        assert!(find_value(enumerants, name).is_none());
        assert!(enumerants.iter().all(|e| e.value != value));
        enumerants.push(Enumerant { name, value });
    }
}
