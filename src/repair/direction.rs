//! Line order and reading direction resolution.
//!
//! Both attributes are inherited: a segment without its own value takes
//! the value of the nearest ancestor that has one, and when no ancestor
//! has one either, a fixed default applies. Only the two horizontal
//! reading directions and the two vertical line orders are supported;
//! any other present value makes the segment unprocessable.

use crate::page::Segment;

/// Attribute holding the line order of a region or page.
pub const TEXT_LINE_ORDER: &str = "textLineOrder";
/// Attribute holding the reading direction of a segment or page.
pub const READING_DIRECTION: &str = "readingDirection";

/// An inheritable ordering attribute with two supported values.
pub trait OrderAttribute: Copy + Sized {
    /// XML attribute name.
    const ATTRIBUTE: &'static str;
    /// Value used when no segment in the chain specifies one.
    const DEFAULT: Self;

    /// Parse a supported value.
    fn parse(value: &str) -> Option<Self>;

    /// Whether this value orders children by descending coordinate.
    fn is_reversed(self) -> bool;
}

/// Order of lines within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrder {
    /// `top-to-bottom`
    TopToBottom,
    /// `bottom-to-top`
    BottomToTop,
}

impl OrderAttribute for LineOrder {
    const ATTRIBUTE: &'static str = TEXT_LINE_ORDER;
    const DEFAULT: Self = LineOrder::TopToBottom;

    fn parse(value: &str) -> Option<Self> {
        match value {
            "top-to-bottom" => Some(LineOrder::TopToBottom),
            "bottom-to-top" => Some(LineOrder::BottomToTop),
            _ => None,
        }
    }

    fn is_reversed(self) -> bool {
        self == LineOrder::BottomToTop
    }
}

/// Order of words within a line or glyphs within a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingDirection {
    /// `left-to-right`
    LeftToRight,
    /// `right-to-left`
    RightToLeft,
}

impl OrderAttribute for ReadingDirection {
    const ATTRIBUTE: &'static str = READING_DIRECTION;
    const DEFAULT: Self = ReadingDirection::LeftToRight;

    fn parse(value: &str) -> Option<Self> {
        match value {
            "left-to-right" => Some(ReadingDirection::LeftToRight),
            "right-to-left" => Some(ReadingDirection::RightToLeft),
            _ => None,
        }
    }

    fn is_reversed(self) -> bool {
        self == ReadingDirection::RightToLeft
    }
}

/// Result of resolving an ordering attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<A> {
    /// A supported value (own, inherited or default)
    Resolved(A),
    /// The nearest present value is not supported
    Unrecognized(String),
}

/// Resolve an attribute over `chain`: the segment's own value first, then
/// its ancestors' values from nearest to farthest.
///
/// # Examples
///
/// ```
/// use page_order_repair::repair::{resolve, ReadingDirection, Resolution};
///
/// let inherited = resolve::<ReadingDirection>([None, Some("right-to-left")]);
/// assert_eq!(inherited, Resolution::Resolved(ReadingDirection::RightToLeft));
///
/// let default = resolve::<ReadingDirection>([None, None]);
/// assert_eq!(default, Resolution::Resolved(ReadingDirection::LeftToRight));
/// ```
pub fn resolve<'a, A: OrderAttribute>(
    chain: impl IntoIterator<Item = Option<&'a str>>,
) -> Resolution<A> {
    match chain.into_iter().flatten().next() {
        None => Resolution::Resolved(A::DEFAULT),
        Some(value) => match A::parse(value) {
            Some(resolved) => Resolution::Resolved(resolved),
            None => Resolution::Unrecognized(value.to_string()),
        },
    }
}

/// Snapshot of the ordering attributes of one ancestor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Segment id (empty for the page)
    pub id: String,
    /// Own `textLineOrder`, if present
    pub line_order: Option<String>,
    /// Own `readingDirection`, if present
    pub reading_direction: Option<String>,
}

impl Frame {
    /// Capture the ordering attributes of `segment`.
    pub fn of(segment: &Segment) -> Self {
        Self {
            id: segment.id().to_string(),
            line_order: segment.attribute(TEXT_LINE_ORDER).map(str::to_string),
            reading_direction: segment.attribute(READING_DIRECTION).map(str::to_string),
        }
    }

    /// Own value of `attribute`.
    pub fn attribute(&self, attribute: &str) -> Option<&str> {
        match attribute {
            TEXT_LINE_ORDER => self.line_order.as_deref(),
            READING_DIRECTION => self.reading_direction.as_deref(),
            _ => None,
        }
    }
}

/// The explicit chain of ancestors of the segment currently visited,
/// outermost first.
///
/// Frames are owned copies, so a child can be mutated while its
/// ancestors' attributes are consulted.
#[derive(Debug, Clone, Default)]
pub struct Ancestry {
    frames: Vec<Frame>,
}

impl Ancestry {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `segment`: it becomes the nearest ancestor.
    pub fn push(&mut self, segment: &Segment) {
        self.frames.push(Frame::of(segment));
    }

    /// Leave the nearest ancestor.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Resolve `A` for `segment` over `[segment] + ancestors`.
    pub fn resolve<A: OrderAttribute>(&self, segment: &Segment) -> Resolution<A> {
        resolve(
            std::iter::once(segment.attribute(A::ATTRIBUTE)).chain(
                self.frames
                    .iter()
                    .rev()
                    .map(|frame| frame.attribute(A::ATTRIBUTE)),
            ),
        )
    }
}
