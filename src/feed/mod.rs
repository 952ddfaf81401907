pub mod parser;
pub mod url;

pub use parser::{parse_page, FeedPage};
pub use url::extract_reader_id;
