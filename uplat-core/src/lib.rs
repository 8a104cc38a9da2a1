pub mod config;
pub mod error;
pub mod extract;
pub mod reader;
pub mod record;

pub use config::UplatConfig;
pub use error::{MalformedRecord, UplatError};
pub use extract::{Extracted, Extractor};
pub use reader::{LogReader, ParseReport, ParseStats};
pub use record::{LogRecord, Sample};
