pub mod diagnostics;
pub mod interpreter;
pub mod keywords;
pub mod parser;
pub mod scanner;
pub mod span;
