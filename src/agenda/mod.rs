//! Agenda document handling
//!
//! An imported agenda is a Markdown document with two parts: the agenda
//! itself and a fill-in template. The split is decided by top-level heading
//! lines (`# `), see [`split_agenda`].

mod splitter;

pub use splitter::{
    split_agenda, template_start, top_level_headings, AgendaSections, Heading,
    TEMPLATE_KEYWORDS, TOP_LEVEL_HEADING,
};
