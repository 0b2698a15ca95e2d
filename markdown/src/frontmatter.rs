//! YAML-style front matter shared by both document kinds.

use chrono::{DateTime, FixedOffset, SecondsFormat};

const FENCE: &str = "---";

pub(crate) struct FrontMatter<'a> {
    pub title: &'a str,
    pub date: DateTime<FixedOffset>,
    pub fields: &'a [(&'a str, String)],
    pub tags: &'a [&'a str],
}

impl FrontMatter<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(FENCE);
        out.push('\n');
        out.push_str(&format!("title: {}\n", self.title));
        out.push_str(&format!(
            "date: {}\n",
            self.date.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        for (key, value) in self.fields {
            out.push_str(&format!("{key}: {value}\n"));
        }
        out.push_str(&format!("tags: [{}]\n", self.tags.join(", ")));
        out.push_str(FENCE);
        out.push('\n');
        out
    }
}

/// The document without a leading front matter block.
///
/// A block that is never closed is treated as ordinary content.
pub(crate) fn body(content: &str) -> &str {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return content;
    };
    if first.trim_end() != FENCE {
        return content;
    }

    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if line.trim_end() == FENCE {
            return &content[offset..];
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_skips_closed_block() {
        let doc = "---\ntitle: x\n# comment\n---\n\n# Vision\n";
        assert_eq!(body(doc), "\n# Vision\n");
    }

    #[test]
    fn body_keeps_unclosed_block() {
        let doc = "---\ntitle: x\n# Vision\n";
        assert_eq!(body(doc), doc);
    }

    #[test]
    fn body_without_front_matter_is_unchanged() {
        assert_eq!(body("# Vision\n---\n"), "# Vision\n---\n");
    }

    #[test]
    fn body_handles_crlf() {
        assert_eq!(body("---\r\ntitle: x\r\n---\r\n# V\r\n"), "# V\r\n");
    }
}
