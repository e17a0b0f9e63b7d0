use crate::blocks::META_BLOCK_KEY;
use crate::canvas::{Command, Page};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: usize,
    pub command_count: usize,
    /// Block names in drawing order, header and footer included.
    pub blocks: Vec<String>,
    pub text_lines: usize,
    pub content_bytes: usize,
    /// Characters written as `?` because WinAnsi has no code for them.
    pub unmapped_chars: usize,
}

impl PageMetrics {
    pub(crate) fn from_page(page_number: usize, page: &Page) -> Self {
        let mut blocks: Vec<String> = Vec::new();
        for name in page.meta_values(META_BLOCK_KEY) {
            if blocks.last().map(String::as_str) != Some(name) {
                blocks.push(name.to_string());
            }
        }
        Self {
            page_number,
            command_count: page
                .commands
                .iter()
                .filter(|cmd| !matches!(cmd, Command::Meta { .. }))
                .count(),
            blocks,
            text_lines: page.strings().count(),
            content_bytes: 0,
            unmapped_chars: 0,
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.iter().any(|block| block == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_bytes: usize,
}

impl DocumentMetrics {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based numbers of the pages a block was drawn on.
    pub fn pages_with_block(&self, name: &str) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|page| page.has_block(name))
            .map(|page| page.page_number)
            .collect()
    }
}
