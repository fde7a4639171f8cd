//! OpenAI API clients: chat completion (reply generation), audio
//! transcription (voice notes) and speech synthesis (voice replies).

mod chat;
mod speech;
mod transcribe;

pub use chat::{ChatClient, ChatError};
pub use speech::{SpeechClient, SpeechError};
pub use transcribe::{TranscribeClient, TranscribeError};
