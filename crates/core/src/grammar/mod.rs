/// JSON views of parse results and trees.
pub mod dump;
/// XML emitter for result and document trees.
pub mod emit;
/// Command-line tokenizer.
pub mod lexer;
/// Word matcher: walks the fat tree and builds the result tree.
pub mod parser;
