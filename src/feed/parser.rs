use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;

use crate::models::{rating_phrase, Book};

/// Longest description kept on a parsed book, in characters
const DESCRIPTION_LIMIT: usize = 500;

/// One parsed page of a reader's shelf feed
#[derive(Debug, Default, PartialEq)]
pub struct FeedPage {
    pub books: Vec<Book>,
    /// Reader display name from the channel title, page 1 only in practice
    pub display_name: Option<String>,
}

/// Field values collected for one `<item>` before conversion
#[derive(Debug, Default)]
struct RawItem {
    title: Option<String>,
    book_id: Option<String>,
    author_name: Option<String>,
    isbn: Option<String>,
    user_rating: Option<String>,
    user_read_at: Option<String>,
    user_date_added: Option<String>,
    user_date_created: Option<String>,
    average_rating: Option<String>,
    book_published: Option<String>,
    num_pages: Option<String>,
    user_review: Option<String>,
    book_large_image_url: Option<String>,
    book_description: Option<String>,
}

impl RawItem {
    fn set_field(&mut self, tag: &[u8], value: String) {
        let slot = match tag {
            b"title" => &mut self.title,
            b"book_id" => &mut self.book_id,
            b"author_name" => &mut self.author_name,
            b"isbn" => &mut self.isbn,
            b"user_rating" => &mut self.user_rating,
            b"user_read_at" => &mut self.user_read_at,
            b"user_date_added" => &mut self.user_date_added,
            b"user_date_created" => &mut self.user_date_created,
            b"average_rating" => &mut self.average_rating,
            b"book_published" => &mut self.book_published,
            b"user_review" => &mut self.user_review,
            b"book_large_image_url" => &mut self.book_large_image_url,
            b"book_description" => &mut self.book_description,
            _ => return,
        };

        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *slot = Some(trimmed.to_string());
        }
    }

    fn set_num_pages(&mut self, value: String) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.num_pages = Some(trimmed.to_string());
        }
    }

    fn into_book(self) -> Book {
        let my_rating = self
            .user_rating
            .and_then(|r| r.parse::<u8>().ok())
            .unwrap_or(0);

        Book {
            title: self.title.map(decode_entities).unwrap_or_default(),
            author: self.author_name.map(decode_entities).unwrap_or_default(),
            book_id: self.book_id.unwrap_or_default(),
            isbn: self.isbn,
            pages: self.num_pages.and_then(|p| p.parse().ok()),
            avg_rating: self
                .average_rating
                .and_then(|r| r.parse::<f64>().ok())
                .filter(|r| *r != 0.0),
            my_rating,
            my_rating_text: rating_phrase(my_rating).map(String::from),
            date_read: self.user_read_at,
            date_added: self.user_date_added,
            date_created: self.user_date_created,
            year_published: self.book_published,
            image_url: self.book_large_image_url,
            review: self.user_review.map(decode_entities),
            description: self
                .book_description
                .map(decode_entities)
                .map(|d| truncate_chars(&d, DESCRIPTION_LIMIT)),
        }
    }
}

/// Decodes the HTML entities the feed is known to leave in free text.
///
/// Applied uniformly to every free-text field (title, author, review,
/// description); the entity set is fixed, not a general HTML unescape.
fn decode_entities(text: String) -> String {
    if !text.contains('&') {
        return text;
    }
    text.replace("&apos;", "'")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
}

/// Truncates to at most `limit` characters on a char boundary, no ellipsis
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Pulls the reader's display name out of a channel title such as
/// "Ben's bookshelf: read"
fn display_name_from_channel_title(title: &str) -> Option<String> {
    let re = Regex::new(r"^(.+?)'s bookshelf").expect("valid bookshelf title regex");
    re.captures(title)
        .map(|captures| captures[1].to_string())
}

/// Parses one page of the shelf feed into typed records.
///
/// Absent or empty fields become `None`; a malformed document never
/// raises, it simply yields the items parsed up to that point.
pub fn parse_page(xml: &str) -> FeedPage {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut page = FeedPage::default();
    let mut item: Option<RawItem> = None;
    // Element context inside the current item
    let mut current_field: Option<Vec<u8>> = None;
    let mut in_book_wrapper = false;
    let mut in_num_pages = false;
    // Channel-level context for the display name; only the first
    // channel-level title is consulted (feeds also carry <image><title>)
    let mut channel_depth = 0usize;
    let mut channel_title_seen = false;
    let mut in_channel_title = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"item" => {
                        item = Some(RawItem::default());
                        in_book_wrapper = false;
                    }
                    b"book" if item.is_some() => in_book_wrapper = true,
                    b"num_pages" if in_book_wrapper => {
                        in_num_pages = true;
                        text.clear();
                    }
                    b"title" if item.is_none() && channel_depth > 0 && !channel_title_seen => {
                        channel_title_seen = true;
                        in_channel_title = true;
                        text.clear();
                    }
                    b"channel" => channel_depth += 1,
                    _ if item.is_some() && !in_book_wrapper => {
                        // A tag nested inside an open field keeps the outer
                        // field's context; its inner text still accumulates
                        if current_field.is_none() {
                            current_field = Some(name);
                            text.clear();
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                let chunk = e
                    .unescape()
                    .map(|cow| cow.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                text.push_str(&chunk);
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"item" => {
                        if let Some(raw) = item.take() {
                            page.books.push(raw.into_book());
                        }
                        current_field = None;
                        in_book_wrapper = false;
                    }
                    b"book" => in_book_wrapper = false,
                    b"num_pages" if in_num_pages => {
                        in_num_pages = false;
                        if let Some(raw) = item.as_mut() {
                            raw.set_num_pages(std::mem::take(&mut text));
                        }
                    }
                    b"channel" => channel_depth = channel_depth.saturating_sub(1),
                    b"title" if in_channel_title => {
                        in_channel_title = false;
                        page.display_name = display_name_from_channel_title(text.trim());
                        text.clear();
                    }
                    _ => {
                        if current_field.as_deref() == Some(name.as_slice()) {
                            current_field = None;
                            if let Some(raw) = item.as_mut() {
                                raw.set_field(&name, std::mem::take(&mut text));
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            // A broken tail loses the rest of the page, never the parse
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    page
}
