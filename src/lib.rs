//! Regular expressions matching exactly the integers of an inclusive range.
//!
//! Given `[start, end]` (arbitrary precision, either sign), the compiler
//! emits a pattern that, matched anchored, accepts the canonical decimal
//! spelling of every integer in the range and nothing else: no integer
//! outside it, no leading zeros, and never `-0`.
//!
//! # Architecture
//!
//! The pipeline is:
//!
//! ```text
//! (start, end) ──sign──> non-negative ranges ──split──> sub-ranges
//!     ──per position──> alternatives ──powers of ten──> collapsed list
//!     ──prefix tree──> factored pattern (kept only if strictly shorter)
//! ```
//!
//! ## Sign handling
//!
//! A signed interval is cut into at most three non-negative problems: the
//! magnitudes of the negative part, the literal `0`, and the positive part.
//! Each magnitude range starts at 1 or higher, so the digit pipeline never
//! sees zero and never has to spell a leading zero.
//!
//! ## Splitting
//!
//! The range is first cut into runs of equal decimal length
//! (`7..150` becomes `7..9`, `10..99`, `100..150`).  Each run is then cut
//! recursively until every piece can be written as one bracket expression
//! per digit position: `100..128` becomes `100..119` (`1[01][0-9]`) and
//! `120..128` (`12[0-8]`).
//!
//! ## Powers of ten
//!
//! Sub-ranges that cover every number of some length (`[1-9]`,
//! `[1-9][0-9]`, `[1-9][0-9]{2}`, ...) are merged when adjacent, so
//! `1..999` becomes `[1-9][0-9]{0,2}` instead of a three-way alternation.
//!
//! ## Prefix factoring
//!
//! The remaining alternatives are loaded into a trie keyed by token and
//! collapsed into nested groups, e.g. `1[0-4]|15` becomes `1([0-4]|5)`.
//! The factored form is a best-effort refinement: it is used only when
//! strictly shorter than the flat alternation, and an inconsistent trie
//! simply leaves the flat form in place.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use indexmap::IndexMap;
use num_bigint::Sign;
use num_traits::One;
use regex_syntax::ast::parse::ParserBuilder;
use regex_syntax::hir::translate::TranslatorBuilder;

/// Re-export so users do not need a direct `num-bigint` dependency.
pub use num_bigint::BigInt;
/// Re-export so users do not need a direct `regex-syntax` dependency.
pub use regex_syntax::hir::Hir;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors raised while reading range bounds or checking a compiled pattern.
///
/// Compiling a range itself cannot fail: every pair of integers has a
/// pattern.
#[derive(Debug)]
pub enum Error {
    /// Text that is not a decimal integer.
    InvalidInteger(String),
    /// A range argument that is not of the form `<lo>..<hi>` or `<value>`.
    InvalidRange(String),
    /// A multi-part range argument (`1..5|10..20`).
    UnsupportedRange(String),
    /// A range bound outside the bounds implied by its integer type.
    OutOfBounds { ty: IntegerType, value: BigInt },
    /// An integer type name other than `int8` .. `uint64`.
    UnknownType(String),
    /// The pattern was rejected by `regex-syntax`.
    Syntax(Box<regex_syntax::Error>),
    /// The pattern was rejected by the `regex` crate.
    Regex(regex::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInteger(text) => write!(f, "invalid integer: {:?}", text),
            Self::InvalidRange(text) => write!(f, "invalid range argument: {:?}", text),
            Self::UnsupportedRange(text) => {
                write!(f, "multi-part range arguments are not supported: {:?}", text)
            }
            Self::OutOfBounds { ty, value } => {
                let (min, max) = ty.bounds();
                write!(f, "{} is outside the {} bounds {}..{}", value, ty, min, max)
            }
            Self::UnknownType(name) => write!(f, "unknown integer type: {:?}", name),
            Self::Syntax(err) => write!(f, "failed to parse pattern: {}", err),
            Self::Regex(err) => write!(f, "failed to compile pattern: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(err) => Some(err.as_ref()),
            Self::Regex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err)
    }
}

/// Parse a decimal integer of any magnitude: an optional sign followed by
/// ASCII digits only.
pub fn parse_integer(text: &str) -> Result<BigInt, Error> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix(|c: char| c == '-' || c == '+')
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidInteger(text.to_string()));
    }
    trimmed
        .parse::<BigInt>()
        .map_err(|_| Error::InvalidInteger(text.to_string()))
}

// ---------------------------------------------------------------------------
// Diagnostic trace
// ---------------------------------------------------------------------------

/// Optional sink for the stage-by-stage printout.
///
/// Write failures are remembered rather than propagated so that tracing can
/// never change the compiled pattern; the first one is reported by
/// [`finish`](Self::finish).
struct Trace<'w> {
    out: Option<&'w mut dyn Write>,
    error: Option<io::Error>,
}

impl<'w> Trace<'w> {
    fn quiet() -> Self {
        Self {
            out: None,
            error: None,
        }
    }

    fn to(out: &'w mut dyn Write) -> Self {
        Self {
            out: Some(out),
            error: None,
        }
    }

    fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Some(out) = self.out.as_mut() {
            if let Err(err) = writeln!(out, "{}", args) {
                self.error = Some(err);
            }
        }
    }

    /// Print a heading followed by one indented line per item and a blank
    /// separator line.
    fn list<T: fmt::Display>(&mut self, heading: &str, items: impl IntoIterator<Item = T>) {
        if !self.is_enabled() {
            return;
        }
        self.line(format_args!("{}", heading));
        for item in items {
            self.line(format_args!(" {}", item));
        }
        self.line(format_args!(""));
    }

    fn finish(self) -> io::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokens and alternatives
// ---------------------------------------------------------------------------

/// The character class matched at one digit position.  Digits are stored
/// as ASCII bytes (`b'0'..=b'9'`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Atom {
    /// A literal digit, e.g. `7`.
    Digit(u8),
    /// Two consecutive digits, `[ab]` with `b == a + 1`.
    Pair(u8),
    /// A contiguous span of three or more digits, `[a-b]`.
    Span(u8, u8),
}

const ANY_DIGIT: Atom = Atom::Span(b'0', b'9');
const NONZERO_DIGIT: Atom = Atom::Span(b'1', b'9');

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Digit(d) => write!(f, "{}", char::from(d)),
            Self::Pair(lo) => write!(f, "[{}{}]", char::from(lo), char::from(lo + 1)),
            Self::Span(lo, hi) => write!(f, "[{}-{}]", char::from(lo), char::from(hi)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Repeat {
    Once,
    /// `?`
    Optional,
    /// `{n}`
    Exactly(usize),
    /// `{min,max}`
    Between(usize, usize),
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Once => Ok(()),
            Self::Optional => f.write_str("?"),
            Self::Exactly(n) => write!(f, "{{{}}}", n),
            Self::Between(min, max) => write!(f, "{{{},{}}}", min, max),
        }
    }
}

/// One position's compiled fragment: an atom and its quantifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Token {
    atom: Atom,
    repeat: Repeat,
}

impl Token {
    const fn once(atom: Atom) -> Self {
        Self {
            atom,
            repeat: Repeat::Once,
        }
    }

    /// A run of `len` consecutive `[0-9]` positions.
    fn any_digits(len: usize) -> Option<Self> {
        let repeat = match len {
            0 => return None,
            1 => Repeat::Once,
            n => Repeat::Exactly(n),
        };
        Some(Self {
            atom: ANY_DIGIT,
            repeat,
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.atom, self.repeat)
    }
}

/// The compiled pattern of one sub-range, as a token sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Alternative(Vec<Token>);

impl Alternative {
    /// Replace every maximal run of two or more `[0-9]` tokens with a
    /// single `[0-9]{n}`.  The matched language is unchanged.
    fn shrink(self) -> Self {
        let mut tokens = Vec::with_capacity(self.0.len());
        let mut run = 0;
        for token in self.0 {
            if token == Token::once(ANY_DIGIT) {
                run += 1;
                continue;
            }
            tokens.extend(Token::any_digits(run));
            run = 0;
            tokens.push(token);
        }
        tokens.extend(Token::any_digits(run));
        Self(tokens)
    }

    /// If this alternative matches every number with exactly `n + 1`
    /// digits, return `n` along with whether zero is included (the bare
    /// `[0-9]` alternative).
    fn power_band(&self) -> Option<(usize, bool)> {
        const ANY: Token = Token::once(ANY_DIGIT);
        const NONZERO: Token = Token::once(NONZERO_DIGIT);
        match self.0.as_slice() {
            [only] if *only == ANY => Some((0, true)),
            [only] if *only == NONZERO => Some((0, false)),
            [lead, rest] if *lead == NONZERO && rest.atom == ANY_DIGIT => match rest.repeat {
                Repeat::Once => Some((1, false)),
                Repeat::Exactly(n) => Some((n, false)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Range splitting
// ---------------------------------------------------------------------------

/// Two equal-length digit strings whose range is expressible as one
/// character class per position.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SubRange {
    start: String,
    end: String,
}

impl SubRange {
    fn new(start: &str, end: &str) -> Self {
        debug_assert_eq!(start.len(), end.len());
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    fn with_leading(mut self, digit: char) -> Self {
        self.start.insert(0, digit);
        self.end.insert(0, digit);
        self
    }

    /// Compare the bounds position by position and emit one token each.
    ///
    /// Panics if a start digit exceeds the end digit at the same position:
    /// the splitter never produces such a pair.
    fn to_alternative(&self) -> Alternative {
        let tokens = self
            .start
            .bytes()
            .zip(self.end.bytes())
            .map(|(lo, hi)| {
                assert!(lo <= hi, "sub-range {} is not position-wise ordered", self);
                let atom = if lo == hi {
                    Atom::Digit(lo)
                } else if lo + 1 == hi {
                    Atom::Pair(lo)
                } else {
                    Atom::Span(lo, hi)
                };
                Token::once(atom)
            })
            .collect();
        Alternative(tokens).shrink()
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Cut `start..=end` (both non-negative, `start <= end`) into runs whose
/// bounds have the same number of digits.
fn split_lengths(start: &BigInt, end: &BigInt) -> Vec<(String, String)> {
    let ten = BigInt::from(10u8);
    let end_digits = end.to_string();
    let mut runs = Vec::new();
    let mut start = start.clone();
    loop {
        let start_digits = start.to_string();
        if start_digits.len() >= end_digits.len() {
            runs.push((start_digits, end_digits));
            return runs;
        }
        let break_point = ten.pow(start_digits.len() as u32) - BigInt::one();
        let next = &break_point + BigInt::one();
        runs.push((start_digits, break_point.to_string()));
        start = next;
    }
}

/// The pair `digit·10^k - 1`, `digit·10^k` spelled with `width` digits.
fn boundary(digit: u8, width: usize) -> (String, String) {
    debug_assert!((b'1'..=b'9').contains(&digit));
    let mut below = String::with_capacity(width);
    below.push(char::from(digit - 1));
    below.extend(std::iter::repeat('9').take(width - 1));
    let mut above = String::with_capacity(width);
    above.push(char::from(digit));
    above.extend(std::iter::repeat('0').take(width - 1));
    (below, above)
}

/// Recursively cut an equal-length range into [`SubRange`]s.
///
/// The cases, checked in order (`S`/`E` are the leading digits):
///
/// 1. one digit: already simple;
/// 2. start tail all `0` and end tail all `9`: already simple;
/// 3. start tail all `0`, `S < E`: cut below `E0…0`;
/// 4. end tail all `9`, `S < E`: cut below `(S+1)0…0`;
/// 5. `S < E`: cut below `(S+1)0…0` and recurse on both halves;
/// 6. `S == E`: recurse on the tails and put `S` back in front.
fn split_digits(start: &str, end: &str) -> Vec<SubRange> {
    debug_assert_eq!(start.len(), end.len());
    let (s, e) = (start.as_bytes(), end.as_bytes());
    if s.len() == 1 {
        return vec![SubRange::new(start, end)];
    }
    let (lead_s, lead_e) = (s[0], e[0]);
    let zero_tail = s[1..].iter().all(|&d| d == b'0');
    let nine_tail = e[1..].iter().all(|&d| d == b'9');

    if zero_tail && nine_tail {
        return vec![SubRange::new(start, end)];
    }
    if zero_tail && lead_s < lead_e {
        let (below, above) = boundary(lead_e, s.len());
        let mut ranges = vec![SubRange::new(start, &below)];
        ranges.extend(split_digits(&above, end));
        return ranges;
    }
    if nine_tail && lead_s < lead_e {
        let (below, above) = boundary(lead_s + 1, s.len());
        let mut ranges = split_digits(start, &below);
        ranges.push(SubRange::new(&above, end));
        return ranges;
    }
    if lead_s < lead_e {
        let (below, above) = boundary(lead_s + 1, s.len());
        let mut ranges = split_digits(start, &below);
        ranges.extend(split_digits(&above, end));
        return ranges;
    }
    assert_eq!(lead_s, lead_e, "digit range {}..{} is reversed", start, end);
    let lead = char::from(lead_s);
    split_digits(&start[1..], &end[1..])
        .into_iter()
        .map(|range| range.with_leading(lead))
        .collect()
}

/// Split a non-negative range into ordered, disjoint [`SubRange`]s that
/// together cover exactly `start..=end`.
fn split_range(start: &BigInt, end: &BigInt, trace: &mut Trace<'_>) -> Vec<SubRange> {
    let runs = split_lengths(start, end);
    let ranges: Vec<SubRange> = runs
        .iter()
        .flat_map(|(s, e)| split_digits(s, e))
        .collect();
    trace.list(
        "First, break into equal length ranges:",
        runs.iter().map(|(s, e)| format!("{}-{}", s, e)),
    );
    trace.list(
        "Second, break into ranges that yield simple regexes:",
        &ranges,
    );
    ranges
}

// ---------------------------------------------------------------------------
// Power-of-ten collapsing
// ---------------------------------------------------------------------------

/// A run of alternatives covering every number with `first + 1` up to
/// `last + 1` digits.
#[derive(Debug)]
struct PowerBand {
    first: usize,
    last: usize,
    /// The run started with `[0-9]` rather than `[1-9]`.
    with_zero: bool,
}

impl PowerBand {
    fn to_alternative(&self) -> Alternative {
        if self.with_zero {
            // Only reachable when zero itself is part of the digit range;
            // this spelling admits leading zeros.
            let repeat = if self.last >= 1 {
                Repeat::Between(1, self.last + 1)
            } else {
                Repeat::Once
            };
            return Alternative(vec![Token {
                atom: ANY_DIGIT,
                repeat,
            }]);
        }
        let mut tokens = vec![Token::once(NONZERO_DIGIT)];
        if self.last >= 1 {
            let repeat = match (self.first, self.last) {
                (0, 1) => Repeat::Optional,
                (1, 1) => Repeat::Once,
                (first, last) if first == last => Repeat::Exactly(first),
                (first, last) => Repeat::Between(first, last),
            };
            tokens.push(Token {
                atom: ANY_DIGIT,
                repeat,
            });
        }
        Alternative(tokens)
    }
}

/// Merge each maximal run of consecutive power-of-ten alternatives into one
/// quantified alternative.  Other alternatives pass through unchanged.
fn collapse_powers_of_ten(alternatives: Vec<Alternative>) -> Vec<Alternative> {
    let mut collapsed = Vec::with_capacity(alternatives.len());
    let mut band: Option<PowerBand> = None;
    for alternative in alternatives {
        let next = alternative.power_band();
        if let (Some(open), Some((digits, false))) = (&mut band, next) {
            if digits == open.last + 1 {
                open.last = digits;
                continue;
            }
        }
        if let Some(done) = band.take() {
            collapsed.push(done.to_alternative());
        }
        match next {
            Some((digits, with_zero)) => {
                band = Some(PowerBand {
                    first: digits,
                    last: digits,
                    with_zero,
                })
            }
            None => collapsed.push(alternative),
        }
    }
    if let Some(done) = band {
        collapsed.push(done.to_alternative());
    }
    collapsed
}

// ---------------------------------------------------------------------------
// Prefix factoring
// ---------------------------------------------------------------------------

/// A trie over alternatives, keyed by token, used to factor out shared
/// leading tokens.
///
/// The root and the "end of alternative" leaves carry no token.
#[derive(Debug)]
struct PrefixTree {
    token: Option<Token>,
    branches: Vec<PrefixTree>,
}

impl PrefixTree {
    /// Build the trie for a flat alternation.  Returns `None` when there is
    /// nothing to factor or the alternatives do not form a consistent trie.
    fn from_alternatives(alternatives: &[Alternative]) -> Option<Self> {
        if alternatives.len() < 2 {
            return None;
        }
        let sequences: Vec<&[Token]> = alternatives.iter().map(|a| a.0.as_slice()).collect();
        Self::build(None, &sequences)
    }

    fn build(token: Option<Token>, sequences: &[&[Token]]) -> Option<Self> {
        // Heads in first-seen order, so the output follows the input order.
        let mut groups: IndexMap<Token, Vec<&[Token]>> = IndexMap::new();
        let mut ended = 0;
        for sequence in sequences {
            match sequence.split_first() {
                Some((head, tail)) => groups.entry(*head).or_default().push(tail),
                None => ended += 1,
            }
        }

        let mut branches = Vec::with_capacity(groups.len() + 1);
        match ended {
            0 => {}
            // A lone sequence that ends here is a plain leaf.
            1 if groups.is_empty() => {}
            1 => branches.push(Self {
                token: None,
                branches: Vec::new(),
            }),
            // Two alternatives spelled identically.
            _ => return None,
        }
        for (head, tails) in groups {
            branches.push(Self::build(Some(head), &tails)?);
        }
        Some(Self { token, branches })
    }

    fn is_end(&self) -> bool {
        self.token.is_none() && self.branches.is_empty()
    }

    /// A leaf holding one unquantified token, which can take a `?`
    /// without being wrapped in a group.
    fn is_single_token(&self) -> bool {
        self.branches.is_empty()
            && self
                .token
                .is_some_and(|token| token.repeat == Repeat::Once)
    }

    /// Render the trie as a pattern.
    fn collapse(&self) -> String {
        let mut out = self.token.map(|t| t.to_string()).unwrap_or_default();
        match self.branches.as_slice() {
            [] => {}
            [only] => out.push_str(&only.collapse()),
            branches => {
                let optional = branches.iter().any(Self::is_end);
                let rest: Vec<&Self> = branches.iter().filter(|b| !b.is_end()).collect();
                match rest.as_slice() {
                    [only] if optional && only.is_single_token() => {
                        out.push_str(&only.collapse());
                        out.push('?');
                    }
                    _ => {
                        out.push('(');
                        for (i, branch) in rest.iter().enumerate() {
                            if i > 0 {
                                out.push('|');
                            }
                            out.push_str(&branch.collapse());
                        }
                        out.push(')');
                        if optional {
                            out.push('?');
                        }
                    }
                }
            }
        }
        out
    }

    /// One row per root-to-leaf path, one cell per node.
    fn to_grid(&self) -> Vec<Vec<String>> {
        let node = match self.token {
            Some(token) => token.to_string(),
            None => ".".to_string(),
        };
        if self.branches.is_empty() {
            return vec![vec![node]];
        }
        self.branches
            .iter()
            .flat_map(|branch| branch.to_grid())
            .map(|row| {
                let mut full = Vec::with_capacity(row.len() + 1);
                full.push(node.clone());
                full.extend(row);
                full
            })
            .collect()
    }

    /// Print the trie as an indented grid: cells shared with the row above
    /// are blanked, and the deepest shared cell becomes a `+--` connector.
    fn write_grid(&self, trace: &mut Trace<'_>) {
        if !trace.is_enabled() {
            return;
        }
        trace.line(format_args!("Parse into tree based on regex prefixes:"));
        let grid = self.to_grid();
        let mut prev: &[String] = &[];
        for row in &grid {
            let shared = row
                .iter()
                .zip(prev)
                .take_while(|(cell, above)| cell == above)
                .count();
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i + 1 == shared {
                        format!("+{}", "-".repeat(cell.len() - 1))
                    } else if i < shared {
                        " ".repeat(cell.len())
                    } else {
                        cell.clone()
                    }
                })
                .collect();
            trace.line(format_args!(" {}", cells.join(" ")));
            prev = row;
        }
        trace.line(format_args!(""));
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

fn join_alternatives(alternatives: &[Alternative]) -> String {
    alternatives
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Compile a range of positive integers.  Bounds are swapped if given out
/// of order.  The result never contains a top-level `|`, so it can be
/// concatenated with a sign.
fn compile_positive(start: &BigInt, end: &BigInt, trace: &mut Trace<'_>) -> String {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    debug_assert!(start >= &BigInt::one());

    let alternatives: Vec<Alternative> = split_range(start, end, trace)
        .iter()
        .map(SubRange::to_alternative)
        .collect();
    trace.list("Turn each range into a regex:", &alternatives);

    let collapsed = collapse_powers_of_ten(alternatives);
    trace.list("Collapse adjacent powers of 10:", &collapsed);

    if let [only] = collapsed.as_slice() {
        return only.to_string();
    }
    let flat = format!("({})", join_alternatives(&collapsed));
    trace.list("Combining the regexes above yields:", [&flat]);

    let Some(tree) = PrefixTree::from_alternatives(&collapsed) else {
        trace.list(" Uh-oh -- problem creating parse tree.", None::<&str>);
        return flat;
    };
    tree.write_grid(trace);
    let factored = tree.collapse();
    trace.list("Turning the parse tree into a regex yields:", [&factored]);
    if factored.len() < flat.len() {
        trace.line(format_args!("We choose the factored one as our result.\n"));
        factored
    } else {
        trace.line(format_args!("We keep the flat alternation as our result.\n"));
        flat
    }
}

fn compile(start: &BigInt, end: &BigInt, trace: &mut Trace<'_>) -> String {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    trace.line(format_args!("Compiling {}..{}\n", start, end));
    let one = BigInt::one();
    match (start.sign(), end.sign()) {
        (Sign::Plus, _) => compile_positive(start, end, trace),
        (Sign::NoSign, Sign::Plus) => format!("(0|{})", compile_positive(&one, end, trace)),
        (Sign::NoSign, _) => "0".to_string(),
        (Sign::Minus, Sign::NoSign) => {
            format!("(0|-{})", compile_positive(&one, &-start, trace))
        }
        (Sign::Minus, Sign::Minus) => {
            format!("(-{})", compile_positive(&-end, &-start, trace))
        }
        (Sign::Minus, Sign::Plus) => {
            let negative = compile_positive(&one, &-start, trace);
            let positive = compile_positive(&one, end, trace);
            format!("(-{}|0|{})", negative, positive)
        }
    }
}

/// Compile a regex matching the decimal spelling of every integer between
/// `start` and `end` inclusive.  The bounds may be given in either order.
///
/// The pattern is meant to be matched against the whole candidate string
/// (see [`RangeRegex::anchored`]).
pub fn compile_range_regex(start: &BigInt, end: &BigInt) -> String {
    compile(start, end, &mut Trace::quiet())
}

/// Like [`compile_range_regex`], additionally writing a human-readable
/// printout of every stage to `out`.
///
/// The returned pattern is identical to the untraced one.  An error is
/// returned only if writing to `out` failed.
pub fn compile_range_regex_traced(
    start: &BigInt,
    end: &BigInt,
    mut out: impl Write,
) -> io::Result<String> {
    let mut trace = Trace::to(&mut out);
    let pattern = compile(start, end, &mut trace);
    trace.finish()?;
    Ok(pattern)
}

// ---------------------------------------------------------------------------
// Compiled range
// ---------------------------------------------------------------------------

/// A compiled range pattern together with its (normalised) bounds.
///
/// `Display` prints the bare pattern, ready to embed as a schema `pattern`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeRegex {
    start: BigInt,
    end: BigInt,
    pattern: String,
}

impl RangeRegex {
    /// Compile the pattern for `start..=end`, in either order.
    pub fn new(start: impl Into<BigInt>, end: impl Into<BigInt>) -> Self {
        let (start, end) = Self::ordered(start.into(), end.into());
        let pattern = compile_range_regex(&start, &end);
        Self {
            start,
            end,
            pattern,
        }
    }

    /// Compile while writing the stage-by-stage printout to `out`.
    pub fn with_trace(
        start: impl Into<BigInt>,
        end: impl Into<BigInt>,
        out: impl Write,
    ) -> io::Result<Self> {
        let (start, end) = Self::ordered(start.into(), end.into());
        let pattern = compile_range_regex_traced(&start, &end, out)?;
        Ok(Self {
            start,
            end,
            pattern,
        })
    }

    fn ordered(start: BigInt, end: BigInt) -> (BigInt, BigInt) {
        if start <= end {
            (start, end)
        } else {
            (end, start)
        }
    }

    /// The lower bound.
    pub fn start(&self) -> &BigInt {
        &self.start
    }

    /// The upper bound.
    pub fn end(&self) -> &BigInt {
        &self.end
    }

    /// The unanchored pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The pattern wrapped for full-string matching: `^(?:pattern)$`.
    pub fn anchored(&self) -> String {
        format!("^(?:{})$", self.pattern)
    }

    /// Whether `value` lies in the range.
    pub fn contains(&self, value: &BigInt) -> bool {
        &self.start <= value && value <= &self.end
    }

    /// Parse the anchored pattern into a `regex-syntax` [`Hir`].
    pub fn hir(&self) -> Result<Hir, Error> {
        let pattern = self.anchored();
        let ast = ParserBuilder::new()
            .build()
            .parse(&pattern)
            .map_err(|e| Error::Syntax(Box::new(e.into())))?;
        TranslatorBuilder::new()
            .unicode(false)
            .build()
            .translate(&pattern, &ast)
            .map_err(|e| Error::Syntax(Box::new(e.into())))
    }

    /// Compile the anchored pattern into a [`regex::Regex`].
    pub fn matcher(&self) -> Result<regex::Regex, Error> {
        Ok(regex::Regex::new(&self.anchored())?)
    }
}

impl fmt::Display for RangeRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

// ---------------------------------------------------------------------------
// Schema integer types
// ---------------------------------------------------------------------------

/// The bounded integer types of a schema, each implying a default range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntegerType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntegerType {
    pub const ALL: [Self; 8] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
    ];

    /// The schema spelling of the type, e.g. `uint16`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    /// The inclusive bounds implied by the type.
    pub fn bounds(self) -> (BigInt, BigInt) {
        match self {
            Self::Int8 => (i8::MIN.into(), i8::MAX.into()),
            Self::Int16 => (i16::MIN.into(), i16::MAX.into()),
            Self::Int32 => (i32::MIN.into(), i32::MAX.into()),
            Self::Int64 => (i64::MIN.into(), i64::MAX.into()),
            Self::Uint8 => (u8::MIN.into(), u8::MAX.into()),
            Self::Uint16 => (u16::MIN.into(), u16::MAX.into()),
            Self::Uint32 => (u32::MIN.into(), u32::MAX.into()),
            Self::Uint64 => (u64::MIN.into(), u64::MAX.into()),
        }
    }

    /// Resolve an optional range argument against the type.
    ///
    /// `"lo..hi"` and a single `"value"` are accepted; `min` and `max`
    /// stand for the type's own bounds.  Reversed bounds are swapped.
    /// Without an argument the type's bounds are returned.
    pub fn range(self, arg: Option<&str>) -> Result<(BigInt, BigInt), Error> {
        let Some(arg) = arg else {
            return Ok(self.bounds());
        };
        if arg.contains('|') {
            return Err(Error::UnsupportedRange(arg.to_string()));
        }
        let (lo, hi) = arg.split_once("..").unwrap_or((arg, arg));
        let lo = self.parse_bound(arg, lo)?;
        let hi = self.parse_bound(arg, hi)?;
        Ok(if lo <= hi { (lo, hi) } else { (hi, lo) })
    }

    fn parse_bound(self, arg: &str, text: &str) -> Result<BigInt, Error> {
        let (min, max) = self.bounds();
        let value = match text.trim() {
            "" => return Err(Error::InvalidRange(arg.to_string())),
            "min" => min.clone(),
            "max" => max.clone(),
            digits => parse_integer(digits)?,
        };
        if value < min || value > max {
            return Err(Error::OutOfBounds { ty: self, value });
        }
        Ok(value)
    }

    /// The pattern for a field of this type, optionally restricted by a
    /// range argument.
    pub fn pattern(self, range: Option<&str>) -> Result<RangeRegex, Error> {
        let (start, end) = self.range(range)?;
        Ok(RangeRegex::new(start, end))
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegerType {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }
}
