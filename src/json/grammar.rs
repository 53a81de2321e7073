//! Dialect grammar assembly
//!
//! [`build_grammar`] turns a [`ParseFlags`] value into a production graph
//! over `char` input with [`Syntax`] content. The graph is assembled
//! bottom-up: digits, numbers, escapes, strings, identifiers, the
//! whitespace/comment skipper, then members, objects and arrays. Objects
//! and arrays are reached from values through two late-bound nodes.
//!
//! Every reachable production has a distinct display name, so shared
//! punctuation literals go through a per-build cache instead of being
//! allocated at each use.

use super::char_class::{raw_char_permitted, CharClass};
use super::flags::{EscapeLevel, ParseFlags, WhitespaceLevel};
use super::number::{Digits, NumberLiteral};
use super::value::{Map, Value};
use crate::peg::parser::log_debug;
use crate::peg::{Content, Grammar, GrammarBuilder, GrammarError, ProductionId};
use ahash::RandomState;
use hashbrown::{HashMap, HashSet};
use num_bigint::BigInt;

// ============================================================================
// Content
// ============================================================================

/// Intermediate content of the dialect grammar
///
/// Terminals produce [`Syntax::Text`]; reducers turn those into digit
/// runs, numeric literals, members and finally [`Syntax::Value`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Syntax {
    /// Zero-width match or skipped input
    #[default]
    Nothing,
    /// Matched or decoded text
    Text(String),
    /// Code point produced by an escape, not yet checked
    CodePoint(u32),
    /// Folded digit run
    Digits(Digits),
    /// Exponent of a decimal literal
    Exponent(BigInt),
    /// Numeric literal
    Number(NumberLiteral),
    /// Finished value
    Value(Value),
    /// Object member
    Member(String, Value),
    /// Default reduction of sequences and repetitions
    List(Vec<Syntax>),
}

impl Content<char> for Syntax {
    fn from_items(items: &[char]) -> Self {
        Syntax::Text(items.iter().collect())
    }

    fn from_list(list: Vec<Self>) -> Self {
        Syntax::List(list)
    }
}

impl Syntax {
    /// The value carried, or `null` for anything else
    pub fn into_value(self) -> Value {
        match self {
            Syntax::Value(value) => value,
            _ => Value::Null,
        }
    }

    /// Decoded text, flattening lists and code points
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Syntax::Text(text) => out.push_str(text),
            Syntax::CodePoint(cp) => out.push(char::from_u32(*cp).unwrap_or('\u{FFFD}')),
            Syntax::List(items) => items.iter().for_each(|item| item.collect_text(out)),
            _ => {}
        }
    }

    /// Every digit of `radix` in the matched text, read at once
    fn digits(&self, radix: u32) -> Digits {
        Digits::parse(&self.text(), radix)
    }

    /// The single character of a one-element match
    fn single_char(&self) -> Option<char> {
        match self {
            Syntax::Text(text) => {
                let mut chars = text.chars();
                let c = chars.next()?;
                chars.next().is_none().then_some(c)
            }
            Syntax::CodePoint(cp) => char::from_u32(*cp),
            _ => None,
        }
    }
}

/// Owned parts of a fixed-arity sequence
fn take<const N: usize>(parts: Vec<Syntax>) -> [Syntax; N] {
    parts
        .try_into()
        .unwrap_or_else(|_: Vec<Syntax>| std::array::from_fn(|_| Syntax::Nothing))
}

fn escaped_code_point_permitted(cp: u32, flags: &ParseFlags) -> bool {
    if cp > 0x10_FFFF {
        return false;
    }
    if CharClass::Surrogate.contains(cp) {
        return flags.allow_surrogates();
    }
    (flags.allow_private_use() || !CharClass::PrivateUse.contains(cp))
        && (flags.allow_non_characters() || !CharClass::NonCharacter.contains(cp))
}

fn simple_escape(c: char, level: EscapeLevel) -> Option<char> {
    let decoded = match c {
        '"' => '"',
        '\\' => '\\',
        '/' => '/',
        'b' => '\u{8}',
        'f' => '\u{C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '\'' if level >= EscapeLevel::SingleQuote => '\'',
        'v' if level >= EscapeLevel::Extended => '\u{B}',
        _ => return None,
    };
    Some(decoded)
}

fn combine_surrogates(high: u32, low: u32) -> Option<u32> {
    ((0xD800..=0xDBFF).contains(&high) && (0xDC00..=0xDFFF).contains(&low))
        .then(|| 0x1_0000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

fn code_point_of(content: &Syntax) -> u32 {
    content.digits(16).value.try_into().unwrap_or(u32::MAX)
}

fn build_object(members: Syntax) -> Syntax {
    let Syntax::List(items) = members else {
        return Syntax::Value(Value::Object(Map::new()));
    };
    let mut map = Map::with_capacity(items.len());
    for item in items {
        if let Syntax::Member(key, value) = item {
            map.insert(key, value);
        }
    }
    Syntax::Value(Value::Object(map))
}

fn duplicate_key(members: &Syntax) -> Option<String> {
    let Syntax::List(items) = members else {
        return None;
    };
    let mut seen: HashSet<&str, RandomState> = HashSet::with_hasher(RandomState::new());
    items.iter().find_map(|item| match item {
        Syntax::Member(key, _) if !seen.insert(key.as_str()) => {
            Some(format!("duplicate key {:?}; the last value wins", key))
        }
        _ => None,
    })
}

fn build_array(elements: Syntax) -> Syntax {
    let values = match elements {
        Syntax::List(items) => items.into_iter().map(Syntax::into_value).collect(),
        _ => Vec::new(),
    };
    Syntax::Value(Value::Array(values))
}

// ============================================================================
// Builder
// ============================================================================

struct DialectBuilder {
    b: GrammarBuilder<char, Syntax>,
    flags: ParseFlags,
    literals: HashMap<String, ProductionId, RandomState>,
    shared: HashMap<&'static str, ProductionId, RandomState>,
}

impl DialectBuilder {
    fn new(flags: ParseFlags) -> Self {
        Self {
            b: GrammarBuilder::new(),
            flags,
            literals: HashMap::with_hasher(RandomState::new()),
            shared: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Shared literal node for `text`
    fn lit(&mut self, text: &str) -> Result<ProductionId, GrammarError> {
        if let Some(&id) = self.literals.get(text) {
            return Ok(id);
        }
        let id = self.b.text(text)?;
        self.literals.insert(text.to_string(), id);
        Ok(id)
    }

    /// Node built once per grammar under `name`
    fn shared<F>(&mut self, name: &'static str, make: F) -> Result<ProductionId, GrammarError>
    where
        F: FnOnce(&mut Self, &'static str) -> Result<ProductionId, GrammarError>,
    {
        if let Some(&id) = self.shared.get(name) {
            return Ok(id);
        }
        let id = make(self, name)?;
        self.shared.insert(name, id);
        Ok(id)
    }

    /// One character satisfying `accept`
    fn char_where<F>(&mut self, name: &str, accept: F) -> ProductionId
    where
        F: Fn(char) -> bool + Send + Sync + 'static,
    {
        let any = self.b.any();
        let id = self
            .b
            .test(name, any, move |content| content.single_char().is_some_and(&accept));
        self.b.unmemoized(id)
    }

    /// Ordered choice, or the option itself when there is only one
    fn one_of(
        &mut self,
        name: &str,
        options: Vec<ProductionId>,
    ) -> Result<ProductionId, GrammarError> {
        match options.as_slice() {
            [single] => Ok(*single),
            _ => self.b.choice(name, options),
        }
    }

    fn decimal_digit(&mut self) -> Result<ProductionId, GrammarError> {
        self.shared("Decimal digit", |this, name| {
            Ok(this.char_where(name, |c| CharClass::DecimalDigit.contains_char(c)))
        })
    }

    fn hex_digit(&mut self) -> Result<ProductionId, GrammarError> {
        self.shared("Hex digit", |this, name| {
            Ok(this.char_where(name, |c| CharClass::HexDigit.contains_char(c)))
        })
    }

    fn four_hex(&mut self) -> Result<ProductionId, GrammarError> {
        let hex = self.hex_digit()?;
        self.shared("Four hex digits", |this, name| {
            this.b.sequence(name, vec![hex, hex, hex, hex])
        })
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn number(&mut self) -> Result<ProductionId, GrammarError> {
        let extended = self.flags.extended_numbers();
        let exact = self.flags.exact_integers();

        let digit = self.decimal_digit()?;
        let digits = self.b.plus(digit);
        let any_digits = self.b.star(digit);
        let nonzero = self.char_where("Nonzero digit", |c| ('1'..='9').contains(&c));
        let zero = self.lit("0")?;
        let nonzero_integer = self.b.sequence("Nonzero integer", vec![nonzero, any_digits])?;
        let integer = self.b.choice_with("Integer part", vec![zero, nonzero_integer], |c| {
            Syntax::Digits(c.digits(10))
        })?;

        let dot = self.lit(".")?;
        let fraction_digits = if extended { any_digits } else { digits };
        let fraction = self.b.sequence_with("Fraction", vec![dot, fraction_digits], |parts| {
            let [_, digits] = take::<2>(parts);
            Syntax::Digits(digits.digits(10))
        })?;
        let fraction = self.b.opt(fraction);

        let decimal_parts = |parts: Vec<Syntax>| {
            let [integer, fraction] = take::<2>(parts).map(|part| match part {
                Syntax::Digits(d) => d,
                _ => Digits::default(),
            });
            Syntax::Number(NumberLiteral::Decimal {
                negative: false,
                integer,
                fraction,
                exponent: BigInt::default(),
            })
        };
        let mut mantissa = self
            .b
            .sequence_with("Mantissa", vec![integer, fraction], decimal_parts)?;
        if extended {
            let leading = self.b.sequence_with("Leading-dot mantissa", vec![dot, digits], |parts| {
                let [_, fraction] = take::<2>(parts);
                Syntax::Number(NumberLiteral::Decimal {
                    negative: false,
                    integer: Digits::default(),
                    fraction: fraction.digits(10),
                    exponent: BigInt::default(),
                })
            })?;
            mantissa = self.b.choice("Decimal mantissa", vec![mantissa, leading])?;
        }

        let plus = self.lit("+")?;
        let minus = self.lit("-")?;
        let sign = self.b.choice("Sign", vec![plus, minus])?;
        let exponent_sign = self.b.opt(sign);
        let lower_e = self.lit("e")?;
        let upper_e = self.lit("E")?;
        let marker = self.b.choice("Exponent marker", vec![lower_e, upper_e])?;
        let exponent = self.b.sequence_with(
            "Exponent",
            vec![marker, exponent_sign, digits],
            |parts| {
                let [_, sign, digits] = take::<3>(parts);
                let magnitude = digits.digits(10).value;
                let negative = sign == Syntax::Text("-".to_string());
                Syntax::Exponent(if negative { -magnitude } else { magnitude })
            },
        )?;
        let exponent = self.b.opt(exponent);
        let decimal = self
            .b
            .sequence_with("Decimal number", vec![mantissa, exponent], |parts| {
                match take::<2>(parts) {
                    [Syntax::Number(NumberLiteral::Decimal {
                        negative,
                        integer,
                        fraction,
                        ..
                    }), Syntax::Exponent(exponent)] => Syntax::Number(NumberLiteral::Decimal {
                        negative,
                        integer,
                        fraction,
                        exponent,
                    }),
                    [mantissa, _] => mantissa,
                }
            })?;

        let (unsigned, number_sign) = if extended {
            let hex_digits = self.hex_digit()?;
            let hex_digits = self.b.plus(hex_digits);
            let lower_x = self.lit("0x")?;
            let upper_x = self.lit("0X")?;
            let prefix = self.b.choice("Hex prefix", vec![lower_x, upper_x])?;
            let hex = self.b.sequence_with("Hex number", vec![prefix, hex_digits], |parts| {
                let [_, digits] = take::<2>(parts);
                Syntax::Number(NumberLiteral::Hex {
                    negative: false,
                    value: digits.digits(16).value,
                })
            })?;
            let infinity = self.b.text_as(
                "Infinity",
                Syntax::Number(NumberLiteral::Infinity { negative: false }),
            )?;
            let nan = self.b.text_as("NaN", Syntax::Number(NumberLiteral::NaN))?;
            let unsigned = self
                .b
                .choice("Unsigned number", vec![hex, infinity, nan, decimal])?;
            (unsigned, self.b.opt(sign))
        } else {
            (decimal, self.b.opt(minus))
        };

        self.b.sequence_with("Number", vec![number_sign, unsigned], move |parts| {
            let [sign, unsigned] = take::<2>(parts);
            let negate = sign == Syntax::Text("-".to_string());
            match unsigned {
                Syntax::Number(literal) => Syntax::Value(literal.negated(negate).into_value(exact)),
                _ => Syntax::Nothing,
            }
        })
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// Escape bodies after the backslash; content is a code point or text
    fn escape_options(&mut self) -> Result<Vec<ProductionId>, GrammarError> {
        let level = self.flags.escapes();
        let hex4 = self.four_hex()?;
        let backslash = self.lit("\\")?;
        let u = self.lit("u")?;

        let simple = self.char_where("Escape character", move |c| simple_escape(c, level).is_some());
        let simple = self.b.xform("Single-character escape", simple, move |content| {
            match content.single_char().and_then(|c| simple_escape(c, level)) {
                Some(c) => Syntax::CodePoint(c as u32),
                None => Syntax::Nothing,
            }
        });

        let pair = self.b.sequence_with(
            "Surrogate pair escape",
            vec![u, hex4, backslash, u, hex4],
            |parts| {
                let [_, high, _, _, low] = take::<5>(parts);
                match combine_surrogates(code_point_of(&high), code_point_of(&low)) {
                    Some(cp) => Syntax::CodePoint(cp),
                    None => Syntax::Nothing,
                }
            },
        )?;
        let pair = self
            .b
            .test("Surrogate pair", pair, |content| matches!(content, Syntax::CodePoint(_)));
        let unicode = self.unicode_escape()?;

        let mut options = vec![simple, pair, unicode];

        if level >= EscapeLevel::Extended {
            let hex = self.hex_digit()?;
            let x = self.lit("x")?;
            let hex_escape = self.b.sequence_with("Hex escape", vec![x, hex, hex], |parts| {
                let [_, high, low] = take::<3>(parts);
                Syntax::CodePoint(code_point_of(&Syntax::List(vec![high, low])))
            })?;
            options.push(hex_escape);
            options.push(self.braced_escape()?);

            let zero = self.lit("0")?;
            let digit = self.decimal_digit()?;
            let no_digit = self.b.has_not(digit);
            let null = self
                .b
                .sequence_with("Null escape", vec![zero, no_digit], |_| Syntax::CodePoint(0))?;
            options.push(null);

            let mut breaks = Vec::new();
            for terminator in ["\r\n", "\r", "\n", "\u{2028}", "\u{2029}"] {
                breaks.push(self.lit(terminator)?);
            }
            let line_break = self.b.choice("Line break", breaks)?;
            let continuation = self
                .b
                .xform("Line continuation", line_break, |_| Syntax::Text(String::new()));
            options.push(continuation);
        }

        if level >= EscapeLevel::Any {
            let raw = self.char_where("Raw escape character", |c| {
                !CharClass::DecimalDigit.contains_char(c)
                    && !CharClass::LineTerminator.contains_char(c)
                    && c != 'x'
                    && c != 'u'
            });
            let raw = self.b.xform("Identity escape", raw, |content| {
                content
                    .single_char()
                    .map_or(Syntax::Nothing, |c| Syntax::CodePoint(c as u32))
            });
            options.push(raw);
        }
        Ok(options)
    }

    /// `uXXXX`
    fn unicode_escape(&mut self) -> Result<ProductionId, GrammarError> {
        let u = self.lit("u")?;
        let hex4 = self.four_hex()?;
        self.shared("Unicode escape", |this, name| {
            this.b.sequence_with(name, vec![u, hex4], |parts| {
                let [_, digits] = take::<2>(parts);
                Syntax::CodePoint(code_point_of(&digits))
            })
        })
    }

    /// `u{X...}`
    fn braced_escape(&mut self) -> Result<ProductionId, GrammarError> {
        let open = self.lit("u{")?;
        let close = self.lit("}")?;
        let hex = self.hex_digit()?;
        let hex_run = self.b.plus(hex);
        self.shared("Braced unicode escape", |this, name| {
            this.b.sequence_with(name, vec![open, hex_run, close], |parts| {
                let [_, digits, _] = take::<3>(parts);
                Syntax::CodePoint(code_point_of(&digits))
            })
        })
    }

    /// `\` followed by an escape body, decoded to text
    fn escape(&mut self) -> Result<ProductionId, GrammarError> {
        let flags = self.flags;
        let backslash = self.lit("\\")?;
        let options = self.escape_options()?;
        let body = self.b.choice("Escape", options)?;
        let escape = self
            .b
            .sequence_with("Escape sequence", vec![backslash, body], |parts| {
                let [_, body] = take::<2>(parts);
                body
            })?;
        let permitted = self.b.test("Permitted escape", escape, move |content| match content {
            Syntax::CodePoint(cp) => escaped_code_point_permitted(*cp, &flags),
            Syntax::Text(_) => true,
            _ => false,
        });
        Ok(self
            .b
            .xform("Escaped text", permitted, |content| Syntax::Text(content.text())))
    }

    fn quoted(
        &mut self,
        name: &str,
        quote: char,
        escape: ProductionId,
    ) -> Result<ProductionId, GrammarError> {
        let flags = self.flags;
        let delimiter = self.lit(&quote.to_string())?;
        let plain = self.char_where(&format!("{} character", name), move |c| {
            c != quote
                && c != '\\'
                && raw_char_permitted(
                    c,
                    flags.allow_control(),
                    flags.allow_private_use(),
                    flags.allow_non_characters(),
                )
        });
        let piece = self.b.choice(&format!("{} piece", name), vec![plain, escape])?;
        let body = self.b.star(piece);
        self.b.sequence_with(
            &format!("{} string", name),
            vec![delimiter, body, delimiter],
            |parts| {
                let [_, body, _] = take::<3>(parts);
                Syntax::Text(body.text())
            },
        )
    }

    fn string(&mut self) -> Result<ProductionId, GrammarError> {
        let escape = self.escape()?;
        let mut options = vec![self.quoted("Double-quoted", '"', escape)?];
        if self.flags.single_quotes() {
            options.push(self.quoted("Single-quoted", '\'', escape)?);
        }
        self.one_of("String", options)
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn identifier(&mut self) -> Result<ProductionId, GrammarError> {
        let backslash = self.lit("\\")?;
        let mut forms = vec![self.unicode_escape()?];
        if self.flags.escapes() >= EscapeLevel::Extended {
            forms.push(self.braced_escape()?);
        }
        let form = self.one_of("Identifier escape form", forms)?;
        let escape = self
            .b
            .sequence_with("Identifier escape", vec![backslash, form], |parts| {
                let [_, code_point] = take::<2>(parts);
                code_point
            })?;
        let any = self.b.any();
        let unit = self.b.choice("Identifier unit", vec![escape, any])?;
        let start = self.b.test("Identifier start", unit, |content| {
            content
                .single_char()
                .is_some_and(|c| CharClass::IdentifierStart.contains_char(c))
        });
        let part = self.b.test("Identifier part", unit, |content| {
            content
                .single_char()
                .is_some_and(|c| CharClass::IdentifierPart.contains_char(c))
        });
        let rest = self.b.star(part);
        self.b
            .sequence_with("Identifier", vec![start, rest], |parts| {
                Syntax::Text(Syntax::List(parts).text())
            })
    }

    // ========================================================================
    // Whitespace and comments
    // ========================================================================

    fn skip(&mut self) -> Result<ProductionId, GrammarError> {
        let mut ignorable = Vec::new();
        match self.flags.whitespace() {
            WhitespaceLevel::None => {}
            WhitespaceLevel::Ansi => ignorable.push(
                self.char_where("Whitespace", |c| CharClass::AnsiWhitespace.contains_char(c)),
            ),
            WhitespaceLevel::Unicode => ignorable.push(
                self.char_where("Whitespace", |c| CharClass::UnicodeWhitespace.contains_char(c)),
            ),
        }

        if self.flags.comments() {
            let open = self.lit("/*")?;
            let close = self.lit("*/")?;
            let not_close = self.b.has_not(close);
            let any = self.b.any();
            let inner = self
                .b
                .sequence("Block comment character", vec![not_close, any])?;
            let inner = self.b.star(inner);
            ignorable.push(self.b.sequence("Block comment", vec![open, inner, close])?);

            let slashes = self.lit("//")?;
            let text = self.char_where("Line comment character", |c| {
                !CharClass::LineTerminator.contains_char(c)
            });
            let text = self.b.star(text);
            let terminator =
                self.char_where("Line terminator", |c| CharClass::LineTerminator.contains_char(c));
            let terminator = self.b.opt(terminator);
            ignorable.push(
                self.b
                    .sequence("Line comment", vec![slashes, text, terminator])?,
            );
        }

        if ignorable.is_empty() {
            return Ok(self.b.empty());
        }
        let ignorable = self.one_of("Ignorable", ignorable)?;
        Ok(self.b.star_with(ignorable, |_| Syntax::Nothing))
    }

    // ========================================================================
    // Values
    // ========================================================================

    fn build(mut self) -> Result<Grammar<char, Syntax>, GrammarError> {
        let skip = self.skip()?;
        let number = self.number()?;
        let string = self.string()?;
        let string_value = self.b.xform("String value", string, |content| {
            Syntax::Value(Value::String(content.text()))
        });
        let keywords = [
            ("true", Value::Bool(true)),
            ("false", Value::Bool(false)),
            ("null", Value::Null),
        ];
        let mut options = vec![string_value, number];
        for (word, value) in keywords {
            options.push(self.b.text_as(word, Syntax::Value(value))?);
        }
        let object = self.b.late_bound();
        let array = self.b.late_bound();
        options.extend([object, array]);
        let bare = self.b.choice("Bare value", options)?;
        let value = self
            .b
            .sequence_with("Value", vec![skip, bare, skip], |parts| {
                let [_, bare, _] = take::<3>(parts);
                bare
            })?;

        let key = if self.flags.unquoted_keys() {
            let identifier = self.identifier()?;
            self.b.choice("Key", vec![string, identifier])?
        } else {
            string
        };
        let colon = self.lit(":")?;
        let member = self
            .b
            .sequence_with("Member", vec![skip, key, skip, colon, value], |parts| {
                let [_, key, _, _, value] = take::<5>(parts);
                Syntax::Member(key.text(), value.into_value())
            })?;

        let comma = self.lit(",")?;
        let members = self.list("Members", member, comma)?;
        let elements = self.list("Elements", value, comma)?;

        let open_brace = self.lit("{")?;
        let close_brace = self.lit("}")?;
        let body = self.b.opt_or(members, Syntax::List(Vec::new()));
        let braced = self.b.sequence_with(
            "Object",
            vec![open_brace, body, skip, close_brace],
            |parts| {
                let [_, members, _, _] = take::<4>(parts);
                members
            },
        )?;
        let checked = self.b.warn("Object keys", braced, duplicate_key);
        let object_value = self.b.xform("Object value", checked, build_object);
        self.b.bind(object, object_value)?;

        let open_bracket = self.lit("[")?;
        let close_bracket = self.lit("]")?;
        let body = self.b.opt_or(elements, Syntax::List(Vec::new()));
        let bracketed = self.b.sequence_with(
            "Array",
            vec![open_bracket, body, skip, close_bracket],
            |parts| {
                let [_, elements, _, _] = take::<4>(parts);
                build_array(elements)
            },
        )?;
        self.b.bind(array, bracketed)?;

        let bof = self.b.bof();
        let eof = self.b.eof();
        let root = self
            .b
            .sequence_with("Document", vec![bof, value, eof], |parts| {
                let [_, value, _] = take::<3>(parts);
                value
            })?;

        let grammar = self.b.build(root)?;
        log_debug!(
            "Built dialect grammar with {} productions for {}",
            grammar.len(),
            self.flags.to_json()
        );
        Ok(grammar)
    }

    /// `item (, item)*`, with one trailing comma when enabled
    fn list(
        &mut self,
        name: &str,
        item: ProductionId,
        comma: ProductionId,
    ) -> Result<ProductionId, GrammarError> {
        let items = self
            .b
            .alternation_with(item, comma, |items, _| Syntax::List(items));
        if !self.flags.trailing_commas() {
            return Ok(items);
        }
        let trailing = self.b.opt(comma);
        self.b
            .sequence_with(name, vec![items, trailing], |parts| {
                let [items, _] = take::<2>(parts);
                items
            })
    }
}

/// Build the dialect grammar for `flags`
pub fn build_grammar(flags: ParseFlags) -> Result<Grammar<char, Syntax>, GrammarError> {
    DialectBuilder::new(flags).build()
}
