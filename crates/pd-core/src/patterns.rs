//! Static substitution dictionaries
//!
//! Two unrelated tables live here and each one has exactly one operation
//! with a fixed direction:
//!
//! - [`MASK_ESCAPES`] / [`expand_mask_escapes`]: a punctuation symbol in the
//!   encoded mask stands for a two-character base64 run.
//! - [`DOMAIN_PATTERNS`] / [`expand_domain_tokens`]: a token in decoded LZP
//!   output stands for a common domain substring.
//!
//! # Examples
//!
//! ```
//! use pd_core::patterns::expand_domain_tokens;
//!
//! assert_eq!(expand_domain_tokens(b"sA"), "sin");
//! assert_eq!(expand_domain_tokens(b"x!K"), "x.com");
//! ```

// =============================================================================
// Mask Escapes
// =============================================================================

/// Escape symbol -> base64 pair it replaces in the encoded mask.
pub const MASK_ESCAPES: &[(u8, &str)] = &[
    (b'!', "AA"),
    (b'@', "gA"),
    (b'#', "AB"),
    (b'\n', "AQ"),
    (b'%', "AE"),
    (b'^', "AC"),
    (b'*', "AI"),
    (b'(', "Ag"),
    (b')', "AD"),
    (b'[', "Aw"),
    (b']', "AM"),
    (b'-', "Bg"),
    (b',', "CA"),
    (b'.', "IA"),
    (b'?', "BA"),
];

static MASK_LOOKUP: [Option<&str>; 256] = {
    let mut table: [Option<&str>; 256] = [None; 256];
    let mut i = 0;
    while i < MASK_ESCAPES.len() {
        let (symbol, pair) = MASK_ESCAPES[i];
        table[symbol as usize] = Some(pair);
        i += 1;
    }
    table
};

/// Replace every mask escape symbol with its base64 pair.
/// Characters that are not escape symbols are copied unchanged.
pub fn expand_mask_escapes(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 2);
    for ch in encoded.chars() {
        match mask_escape(ch) {
            Some(pair) => out.push_str(pair),
            None => out.push(ch),
        }
    }
    out
}

#[inline]
fn mask_escape(ch: char) -> Option<&'static str> {
    if ch.is_ascii() {
        MASK_LOOKUP[ch as usize]
    } else {
        None
    }
}

// =============================================================================
// Domain Patterns
// =============================================================================

/// Token prefix for the two-character dictionary entries.
pub const PAIR_PREFIX: u8 = b'!';

/// Domain token -> expansion, in application order.
///
/// All `!`-prefixed pairs come first: several of their second characters are
/// single-character tokens on their own.
pub const DOMAIN_PATTERNS: &[(&str, &str)] = &[
    ("!A", "porn"), ("!B", "film"), ("!C", "lord"), ("!D", "kino"),
    ("!E", "oker"), ("!F", "trad"), ("!G", "line"), ("!H", "game"),
    ("!I", "pdom"), ("!J", "tion"), ("!K", ".com"), ("!L", "leon"),
    ("!M", "port"), ("!N", "shop"), ("!O", "club"), ("!P", "prav"),
    ("!Q", "vest"), ("!R", "inco"), ("!S", "mark"), ("!T", "ital"),
    ("!U", "slot"), ("!V", "play"), ("!W", "eria"), ("!X", "russ"),
    ("!Y", "vide"), ("!Z", "tube"), ("!@", "medi"), ("!#", "ster"),
    ("!%", "nter"), ("!^", "scho"), ("!&", "free"), ("!*", "enta"),
    ("!(", "best"), ("!)", "mega"), ("!=", "gama"), ("!+", "prof"),
    ("!/", "oney"), ("!,", "rypt"), ("!<", "kra3"), ("!>", "stor"),
    ("!~", "ture"), ("![", "tech"), ("!]", "ance"), ("!{", "coin"),
    ("!}", "seed"), ("!`", "anim"), ("!:", "stro"), ("!;", "ment"),
    ("!?", "site"),
    ("A", "in"), ("B", "an"), ("C", "er"), ("D", "ar"), ("E", "or"),
    ("F", "et"), ("G", "al"), ("H", "st"), ("I", "on"), ("J", "en"),
    ("K", "at"), ("L", "ro"), ("M", "es"), ("N", "as"), ("O", "el"),
    ("P", "it"), ("Q", "ch"), ("R", "am"), ("S", "ol"), ("T", "om"),
    ("U", "ra"), ("V", "ex"), ("W", "is"), ("X", "ic"), ("Y", "re"),
    ("Z", "os"), ("@", "ka"), ("#", "ot"), ("$", "us"), ("%", "ap"),
    ("^", "ov"), ("&", "im"), ("*", "-s"), ("(", "ad"), (")", "il"),
    ("=", "op"), ("+", "ed"), ("/", "em"), (",", "a-"), ("<", "od"),
    (">", "ir"), ("~", "id"), ("[", "ob"), ("]", "ag"), ("{", "ig"),
    ("}", "ip"), ("`", "ok"), (":", "e-"), (";", "ec"), ("?", "un"),
];

struct DomainLookup {
    pairs: [Option<&'static str>; 256],
    singles: [Option<&'static str>; 256],
}

static DOMAIN_LOOKUP: DomainLookup = {
    let mut pairs: [Option<&str>; 256] = [None; 256];
    let mut singles: [Option<&str>; 256] = [None; 256];
    let mut i = 0;
    while i < DOMAIN_PATTERNS.len() {
        let (token, expansion) = DOMAIN_PATTERNS[i];
        let bytes = token.as_bytes();
        if bytes.len() == 2 {
            pairs[bytes[1] as usize] = Some(expansion);
        } else {
            singles[bytes[0] as usize] = Some(expansion);
        }
        i += 1;
    }
    DomainLookup { pairs, singles }
};

/// Expand dictionary tokens in raw decoded bytes.
///
/// Single left-to-right pass. At each position a `!`-prefixed pair is tried
/// before any single-character token; bytes that start no token are copied.
/// Not idempotent: call it once per entry.
pub fn expand_domain_tokens(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b == PAIR_PREFIX {
            if let Some(expansion) = raw.get(i + 1).and_then(|&n| DOMAIN_LOOKUP.pairs[n as usize]) {
                out.push_str(expansion);
                i += 2;
                continue;
            }
        }
        match DOMAIN_LOOKUP.singles[b as usize] {
            Some(expansion) => out.push_str(expansion),
            None => out.push(b as char),
        }
        i += 1;
    }
    out
}

/// Whether `b` can start or complete a domain token.
pub fn is_domain_token_byte(b: u8) -> bool {
    b == PAIR_PREFIX || DOMAIN_LOOKUP.singles[b as usize].is_some() || DOMAIN_LOOKUP.pairs[b as usize].is_some()
}

/// Whether `b` occurs anywhere in a domain expansion.
pub fn occurs_in_expansion(b: u8) -> bool {
    DOMAIN_PATTERNS
        .iter()
        .any(|(_, expansion)| expansion.as_bytes().contains(&b))
}
