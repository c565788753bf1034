/// Configuration options for [`PullParser`](crate::PullParser).
///
/// Options are fixed at construction time; the parser never reconfigures
/// itself mid-document.
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Size in bytes of the fixed pull buffer the parser reads the source
    /// through. The parser holds at most one buffer of unconsumed bytes, so
    /// peak read-ahead is bounded by this value. Any capacity down to a
    /// single byte produces the same token stream.
    ///
    /// # Default
    ///
    /// 1 MiB.
    pub buffer_capacity: usize,

    /// Cap on the in-progress byte length of a single string or number
    /// lexeme. The check runs before every append, so no allocation beyond
    /// the cap ever happens; exceeding it fails the parse with
    /// [`ErrorKind::ValueTooLong`](crate::ErrorKind::ValueTooLong). The cap
    /// applies per lexeme, not to the sum of emitted tokens.
    ///
    /// # Default
    ///
    /// 10 MiB.
    pub max_value_length: usize,

    /// How JSON numbers materialize into [`Number`](crate::Number) values.
    ///
    /// # Default
    ///
    /// [`NumberMode::IntDouble`].
    pub number_mode: NumberMode,

    /// Whether to parse multiple whitespace-separated JSON values from a
    /// single source.
    ///
    /// When `true`, the parser does not stop at the first top-level value
    /// but continues with any further values, resetting the path between
    /// roots. This supports JSON Lines (JSONL) and arbitrary concatenations
    /// such as `{}{}{}`. When `false`, any non-whitespace byte after the
    /// root value fails the parse.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_multiple_values: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 1024 * 1024,
            max_value_length: 10 * 1024 * 1024,
            number_mode: NumberMode::IntDouble,
            allow_multiple_values: false,
        }
    }
}

/// Strategy for materializing JSON numbers.
///
/// Both modes accept exactly the same number grammar; they differ only in
/// the produced [`Number`](crate::Number) variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberMode {
    /// Integers of at most 18 digits and no fraction or exponent become
    /// [`Number::Int`](crate::Number::Int); every other number becomes
    /// [`Number::Double`](crate::Number::Double). Values outside the finite
    /// `f64` range become infinities, and values beyond `f64` precision
    /// round silently.
    #[default]
    IntDouble,
    /// Every number becomes a [`Decimal`](crate::Decimal) preserving the
    /// exact source lexeme, so re-emission is drift-free at any precision.
    AllDecimal,
}
