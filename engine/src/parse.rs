use crate::error::ParseError;

pub const NEWLINE: u8 = b'\n';
pub const SEMICOLON: u8 = b';';
pub const MINUS: u8 = b'-';
pub const PERIOD: u8 = b'.';

const NOT_DIGIT: u8 = 0xff;

#[derive(Clone, Copy)]
struct Sign {
    skip: usize,
    factor: i32,
}

/// Layout of the unsigned part of a token, chosen by the byte right after the
/// first digit: `.` means `D.D`, a digit means `DD.D`.
#[derive(Clone, Copy)]
struct Shape {
    valid: bool,
    /// Bytes from the first digit up to (not including) the terminator.
    len: usize,
    /// Weight of the first digit.
    lead: i32,
    /// Weight of the byte at offset 1.
    second: i32,
    dot: usize,
    frac: usize,
}

const SHORT: Shape = Shape {
    valid: true,
    len: 3,
    lead: 10,
    second: 0,
    dot: 1,
    frac: 2,
};

const WIDE: Shape = Shape {
    valid: true,
    len: 4,
    lead: 100,
    second: 10,
    dot: 2,
    frac: 3,
};

const BAD: Shape = Shape {
    valid: false,
    lead: 0,
    second: 0,
    ..SHORT
};

static SIGNS: [Sign; 256] = {
    let mut table = [Sign { skip: 0, factor: 1 }; 256];
    table[MINUS as usize] = Sign {
        skip: 1,
        factor: -1,
    };
    table
};

static SHAPES: [Shape; 256] = {
    let mut table = [BAD; 256];
    table[PERIOD as usize] = SHORT;
    let mut d = b'0';
    while d <= b'9' {
        table[d as usize] = WIDE;
        d += 1;
    }
    table
};

static DIGITS: [u8; 256] = {
    let mut table = [NOT_DIGIT; 256];
    let mut d = b'0';
    while d <= b'9' {
        table[d as usize] = d - b'0';
        d += 1;
    }
    table
};

/// Parses the temperature that starts at `start` and returns it in tenths,
/// together with the offset just past its line terminator.
///
/// `bytes` must end where the caller's region ends: a token running into the
/// end of `bytes` is accepted as the unterminated last line. The value is
/// assembled from table-selected weights, the only branch is the final
/// validity check.
#[inline]
pub fn parse_tenths(bytes: &[u8], start: usize) -> Result<(i32, usize), ParseError> {
    let at = |i: usize| bytes.get(i).copied().unwrap_or(0);

    let sign = SIGNS[at(start) as usize];
    let p = start + sign.skip;
    let shape = SHAPES[at(p + 1) as usize];

    let lead = DIGITS[at(p) as usize];
    let second = DIGITS[at(p + 1) as usize];
    let frac = DIGITS[at(p + shape.frac) as usize];

    let magnitude =
        lead as i32 * shape.lead + second as i32 * shape.second + frac as i32;

    let end = p + shape.len;
    let terminated = (at(end) == NEWLINE) | (end == bytes.len());
    let ok = shape.valid & (lead.max(frac) <= 9) & (at(p + shape.dot) == PERIOD) & terminated;

    if !ok {
        return Err(ParseError {
            start,
            end: (end + 1).min(bytes.len()).max(start),
        });
    }

    Ok((sign.factor * magnitude, (end + 1).min(bytes.len())))
}
