pub mod code_generator;
