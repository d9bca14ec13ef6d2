//! Manual sections
//!
//! A manual section is a run of lines between two marker comments. Whatever a
//! maintainer writes between the markers is carried verbatim into the next
//! generated version of the file:
//!
//! ```text
//! // * START MANUAL SECTION [imports] *
//! use std::collections::BTreeMap;
//! // * END MANUAL SECTION *
//! ```
//!
//! The `[tag]` is optional. Tagged placeholders in a fresh skeleton receive the
//! block with the same tag; everything else is matched by position.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};
use thiserror::Error;

pub const START_MARKER: &str = "// * START MANUAL SECTION *";
pub const END_MARKER: &str = "// * END MANUAL SECTION *";

static START_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*// \* START MANUAL SECTION(?: \[([A-Za-z0-9_-]+)\])? \*\s*$").unwrap()
});
static END_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*// \* END MANUAL SECTION \*\s*$").unwrap());

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManualSectionError {
    #[error("manual section opened on line {line} is never closed")]
    Unterminated { line: usize },

    #[error("line {line} closes a manual section that was never opened")]
    UnexpectedEnd { line: usize },

    #[error("line {line} opens a manual section inside the one opened on line {open}")]
    Nested { line: usize, open: usize },

    #[error("manual section tag '{tag}' is used by more than one placeholder")]
    DuplicateTag { tag: String },

    #[error(
        "{placeholders} placeholder(s) cannot hold {extracted} block(s); \
         {discarded} non-empty block(s) would be lost"
    )]
    ShapeMismatch {
        placeholders: usize,
        extracted: usize,
        discarded: usize,
    },
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualBlock {
    pub tag: Option<String>,
    /// Lines strictly between the markers, without their terminators.
    pub lines: Vec<String>,
}

impl ManualBlock {
    pub fn new(tag: Option<&str>, content: &str) -> Self {
        Self {
            tag: tag.map(str::to_string),
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

/// What to do when manual blocks no longer fit the regenerated skeleton.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShapeMismatchPolicy {
    /// Inject what fits and report the rest.
    #[default]
    Warn,
    /// Refuse when a non-empty block would be lost.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub text: String,
    pub placeholders: usize,
    pub extracted: usize,
    /// Blocks that found no placeholder.
    pub discarded: Vec<ManualBlock>,
}

impl Injection {
    /// True when carried blocks and placeholders did not line up one to one.
    /// Injecting no blocks at all is never a mismatch.
    pub fn is_shape_mismatch(&self) -> bool {
        self.extracted > 0 && (self.placeholders != self.extracted || !self.discarded.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker<'a> {
    Start(Option<&'a str>),
    End,
}

fn marker(line: &str) -> Option<Marker<'_>> {
    if let Some(caps) = START_LINE.captures(line) {
        return Some(Marker::Start(caps.get(1).map(|m| m.as_str())));
    }
    END_LINE.is_match(line).then_some(Marker::End)
}

pub(crate) fn opens_section(line: &str) -> bool {
    START_LINE.is_match(line)
}

pub(crate) fn closes_section(line: &str) -> bool {
    END_LINE.is_match(line)
}

/// Line indices of a START marker and its matching END marker.
#[derive(Debug)]
struct Region {
    start: usize,
    end: usize,
    tag: Option<String>,
}

fn scan(lines: &[&str]) -> Result<Vec<Region>, ManualSectionError> {
    let mut regions = Vec::new();
    let mut open: Option<(usize, Option<String>)> = None;

    for (idx, line) in lines.iter().enumerate() {
        match marker(line) {
            Some(Marker::Start(tag)) => {
                if let Some((start, _)) = &open {
                    return Err(ManualSectionError::Nested {
                        line: idx + 1,
                        open: start + 1,
                    });
                }
                open = Some((idx, tag.map(str::to_string)));
            }
            Some(Marker::End) => match open.take() {
                Some((start, tag)) => regions.push(Region {
                    start,
                    end: idx,
                    tag,
                }),
                None => return Err(ManualSectionError::UnexpectedEnd { line: idx + 1 }),
            },
            None => {}
        }
    }

    match open {
        Some((start, _)) => Err(ManualSectionError::Unterminated { line: start + 1 }),
        None => Ok(regions),
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Render an empty placeholder, indenting both marker lines.
pub fn placeholder(tag: Option<&str>, indent: &str) -> String {
    match tag {
        Some(tag) => format!("{indent}// * START MANUAL SECTION [{tag}] *\n{indent}{END_MARKER}"),
        None => format!("{indent}{START_MARKER}\n{indent}{END_MARKER}"),
    }
}

/// Ordered manual blocks of `text`.
pub fn extract(text: &str) -> Result<Vec<ManualBlock>, ManualSectionError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let blocks = scan(&lines)?
        .into_iter()
        .map(|region| ManualBlock {
            tag: region.tag,
            lines: lines[region.start + 1..region.end]
                .iter()
                .map(|line| line.to_string())
                .collect(),
        })
        .collect();
    Ok(blocks)
}

/// `text` with every closed manual block emptied, leaving the markers.
///
/// Never fails: a START without an END blanks nothing and stray END lines are
/// kept as ordinary text, so a damaged file still gets a stable digest.
pub fn blank(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut keep = vec![true; lines.len()];
    let mut open: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        match marker(line) {
            Some(Marker::Start(_)) if open.is_none() => open = Some(idx),
            Some(Marker::End) => {
                if let Some(start) = open.take() {
                    keep[start + 1..idx].iter_mut().for_each(|k| *k = false);
                }
            }
            _ => {}
        }
    }

    lines
        .iter()
        .zip(keep)
        .filter_map(|(line, keep)| keep.then_some(*line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill the placeholders of `skeleton` with `blocks`.
///
/// Tagged placeholders take the first block carrying the same tag. Placeholders
/// still empty afterwards take the remaining blocks in order, including tagged
/// blocks whose tag no placeholder carries anymore. Blocks left over are
/// returned in [`Injection::discarded`].
pub fn inject(
    skeleton: &str,
    blocks: &[ManualBlock],
    policy: ShapeMismatchPolicy,
) -> Result<Injection, ManualSectionError> {
    let lines: Vec<&str> = skeleton.split('\n').collect();
    let regions = scan(&lines)?;

    let mut tags = HashSet::new();
    for tag in regions.iter().filter_map(|region| region.tag.as_deref()) {
        if !tags.insert(tag) {
            return Err(ManualSectionError::DuplicateTag {
                tag: tag.to_string(),
            });
        }
    }

    let mut used = vec![false; blocks.len()];
    let mut assignment: Vec<Option<usize>> = vec![None; regions.len()];

    for (slot, region) in regions.iter().enumerate() {
        let Some(tag) = region.tag.as_deref() else {
            continue;
        };
        let found = blocks
            .iter()
            .enumerate()
            .find(|(idx, block)| !used[*idx] && block.tag.as_deref() == Some(tag))
            .map(|(idx, _)| idx);
        if let Some(idx) = found {
            used[idx] = true;
            assignment[slot] = Some(idx);
        }
    }

    let unmatched: Vec<usize> = (0..blocks.len()).filter(|idx| !used[*idx]).collect();
    let mut remaining = unmatched.into_iter();
    for slot in assignment.iter_mut().filter(|slot| slot.is_none()) {
        match remaining.next() {
            Some(idx) => {
                used[idx] = true;
                *slot = Some(idx);
            }
            None => break,
        }
    }

    let discarded: Vec<ManualBlock> = blocks
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(block, _)| block.clone())
        .collect();

    if policy == ShapeMismatchPolicy::Fail {
        let lost = discarded.iter().filter(|block| !block.is_blank()).count();
        if lost > 0 {
            return Err(ManualSectionError::ShapeMismatch {
                placeholders: regions.len(),
                extracted: blocks.len(),
                discarded: lost,
            });
        }
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut idx = 0;
    let mut next_region = regions.iter().zip(&assignment).peekable();
    while idx < lines.len() {
        match next_region.peek() {
            Some((region, assigned)) if region.start == idx => {
                out.push(lines[region.start]);
                if let Some(block) = assigned.map(|b| &blocks[b]) {
                    out.extend(block.lines.iter().map(String::as_str));
                }
                out.push(lines[region.end]);
                idx = region.end + 1;
                next_region.next();
            }
            _ => {
                out.push(lines[idx]);
                idx += 1;
            }
        }
    }

    Ok(Injection {
        text: out.join("\n"),
        placeholders: regions.len(),
        extracted: blocks.len(),
        discarded,
    })
}
