pub mod claude;
pub mod gemini;
pub mod health;
pub mod openai;
pub mod respond;
