pub mod chat;
pub mod ner;
