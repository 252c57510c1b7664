use crate::spec::grammar::{Builder, MaskCategory, ValueCategory};
use bitflags::bitflags;

bitflags! {
    #[derive(Default)]
    pub struct FpFastMathMode: u32 {
        const NOT_NAN     = 1 << 0;
        const NOT_INF     = 1 << 1;
        const NSZ         = 1 << 2;
        const ALLOW_RECIP = 1 << 3;
        const FAST        = 1 << 4;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SelectionControl: u32 {
        const FLATTEN      = 1 << 0;
        const DONT_FLATTEN = 1 << 1;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct LoopControl: u32 {
        const UNROLL              = 1 << 0;
        const DONT_UNROLL         = 1 << 1;
        const DEPENDENCY_INFINITE = 1 << 2;
        const DEPENDENCY_LENGTH   = 1 << 3;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct FunctionControl: u32 {
        const INLINE      = 1 << 0;
        const DONT_INLINE = 1 << 1;
        const PURE        = 1 << 2;
        const CONST       = 1 << 3;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct MemoryAccess: u32 {
        const VOLATILE    = 1 << 0;
        const ALIGNED     = 1 << 1;
        const NONTEMPORAL = 1 << 2;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct ImageOperands: u32 {
        const BIAS          = 1 << 0;
        const LOD           = 1 << 1;
        const GRAD          = 1 << 2;
        const CONST_OFFSET  = 1 << 3;
        const OFFSET        = 1 << 4;
        const CONST_OFFSETS = 1 << 5;
        const SAMPLE        = 1 << 6;
        const MIN_LOD       = 1 << 7;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct KernelProfilingInfo: u32 {
        const CMD_EXEC_TIME = 1 << 0;
    }
}

/// A typed view of one mask category.
pub trait MaskFlags: Sized + Copy {
    const CATEGORY: MaskCategory;

    fn from_mask_bits(bits: u32) -> Option<Self>;

    fn mask_bits(self) -> u32;
}

macro_rules! impl_mask_flags {
    ($($flags:ident),* $(,)?) => {
        $(
            impl MaskFlags for $flags {
                const CATEGORY: MaskCategory = MaskCategory::$flags;

                fn from_mask_bits(bits: u32) -> Option<Self> {
                    $flags::from_bits(bits)
                }

                fn mask_bits(self) -> u32 {
                    self.bits()
                }
            }
        )*
    };
}

impl_mask_flags!(
    FpFastMathMode,
    SelectionControl,
    LoopControl,
    FunctionControl,
    MemoryAccess,
    ImageOperands,
    KernelProfilingInfo,
);

// NOTE Registration order is the order `format_mask` lists names in, so keep
// each category sorted by bit.

fn gen_fp_fast_math(builder: &mut Builder) {
    let c = MaskCategory::FpFastMathMode;
    builder.register_mask(c, "None", FpFastMathMode::empty().bits());
    builder.register_mask(c, "NotNaN", FpFastMathMode::NOT_NAN.bits());
    builder.register_mask(c, "NotInf", FpFastMathMode::NOT_INF.bits());
    builder.register_mask(c, "NSZ", FpFastMathMode::NSZ.bits());
    builder.register_mask(c, "AllowRecip", FpFastMathMode::ALLOW_RECIP.bits());
    builder.register_mask(c, "Fast", FpFastMathMode::FAST.bits());
}

fn gen_control(builder: &mut Builder) {
    let c = MaskCategory::SelectionControl;
    builder.register_mask(c, "None", SelectionControl::empty().bits());
    builder.register_mask(c, "Flatten", SelectionControl::FLATTEN.bits());
    builder.register_mask(c, "DontFlatten", SelectionControl::DONT_FLATTEN.bits());

    let c = MaskCategory::LoopControl;
    builder.register_mask(c, "None", LoopControl::empty().bits());
    builder.register_mask(c, "Unroll", LoopControl::UNROLL.bits());
    builder.register_mask(c, "DontUnroll", LoopControl::DONT_UNROLL.bits());
    builder.register_mask(c, "DependencyInfinite", LoopControl::DEPENDENCY_INFINITE.bits());
    builder.register_mask(c, "DependencyLength", LoopControl::DEPENDENCY_LENGTH.bits());

    let c = MaskCategory::FunctionControl;
    builder.register_mask(c, "None", FunctionControl::empty().bits());
    builder.register_mask(c, "Inline", FunctionControl::INLINE.bits());
    builder.register_mask(c, "DontInline", FunctionControl::DONT_INLINE.bits());
    builder.register_mask(c, "Pure", FunctionControl::PURE.bits());
    builder.register_mask(c, "Const", FunctionControl::CONST.bits());
}

fn gen_mem(builder: &mut Builder) {
    let c = MaskCategory::MemoryAccess;
    builder.register_mask(c, "None", MemoryAccess::empty().bits());
    builder.register_mask(c, "Volatile", MemoryAccess::VOLATILE.bits());
    builder.register_mask(c, "Aligned", MemoryAccess::ALIGNED.bits());
    builder.register_mask(c, "Nontemporal", MemoryAccess::NONTEMPORAL.bits());
}

fn gen_image(builder: &mut Builder) {
    let c = MaskCategory::ImageOperands;
    builder.register_mask(c, "None", ImageOperands::empty().bits());
    builder.register_mask(c, "Bias", ImageOperands::BIAS.bits());
    builder.register_mask(c, "Lod", ImageOperands::LOD.bits());
    builder.register_mask(c, "Grad", ImageOperands::GRAD.bits());
    builder.register_mask(c, "ConstOffset", ImageOperands::CONST_OFFSET.bits());
    builder.register_mask(c, "Offset", ImageOperands::OFFSET.bits());
    builder.register_mask(c, "ConstOffsets", ImageOperands::CONST_OFFSETS.bits());
    builder.register_mask(c, "Sample", ImageOperands::SAMPLE.bits());
    builder.register_mask(c, "MinLod", ImageOperands::MIN_LOD.bits());

    let c = ValueCategory::SamplerAddressingMode;
    builder.register_value(c, "None", 0);
    builder.register_value(c, "ClampToEdge", 1);
    builder.register_value(c, "Clamp", 2);
    builder.register_value(c, "Repeat", 3);
    builder.register_value(c, "RepeatMirrored", 4);

    let c = ValueCategory::SamplerFilterMode;
    builder.register_value(c, "Nearest", 0);
    builder.register_value(c, "Linear", 1);
}

fn gen_kernel(builder: &mut Builder) {
    let c = MaskCategory::KernelProfilingInfo;
    builder.register_mask(c, "None", KernelProfilingInfo::empty().bits());
    builder.register_mask(c, "CmdExecTime", KernelProfilingInfo::CMD_EXEC_TIME.bits());
}

pub(crate) fn register(builder: &mut Builder) {
    gen_fp_fast_math(builder);
    gen_control(builder);
    gen_mem(builder);
    gen_image(builder);
    gen_kernel(builder);
}
