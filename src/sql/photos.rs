// src/sql/photos.rs
//! Rider photo updates. Each statement only fills an empty `photo_url`, so running
//! the script twice, or after a photo was set by hand, changes nothing.

use std::fmt::Write as _;

use super::{comment_text, quoted};

/// A rider id with the data URL to store for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoUpdate {
    pub id: u32,
    pub name: String,
    pub data_url: String,
}

const VERIFY: &str = "
-- Verify the update
SELECT
  COUNT(*) AS total_riders,
  COUNT(*) FILTER (WHERE photo_url LIKE 'data:image/%') AS with_photo
FROM riders;
";

pub fn render_photos_script(source_name: &str, updates: &[PhotoUpdate]) -> String {
    let mut sql = String::new();
    let _ = writeln!(sql, "-- SQL Script to set rider photos for riders in {}", comment_text(source_name));
    let _ = writeln!(sql, "-- Photos: {}", updates.len());

    if updates.is_empty() {
        sql.push_str("\n-- No photos found\n");
        return sql;
    }
    for u in updates {
        let _ = writeln!(sql, "\n-- {} (id {})", comment_text(&u.name), u.id);
        let _ = writeln!(
            sql,
            "UPDATE riders SET photo_url = {}\nWHERE id = {} AND (photo_url IS NULL OR photo_url = '');",
            quoted(&u.data_url),
            u.id
        );
    }
    sql.push_str(VERIFY);
    sql
}
