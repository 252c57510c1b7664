pub mod enumerant;
