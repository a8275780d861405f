use crate::types::Number;

/// Appends `number` the way a JavaScript `Number#toString` would.
pub(crate) fn push_number(out: &mut String, number: &Number) {
    match number {
        Number::PosInt(u) => out.push_str(itoa::Buffer::new().format(*u)),
        Number::NegInt(i) => out.push_str(itoa::Buffer::new().format(*i)),
        Number::Float(f) => push_float(out, *f),
    }
}

pub(crate) fn number_to_string(number: &Number) -> String {
    let mut out = String::new();
    push_number(&mut out, number);
    out
}

/// Fixed notation for `1e-7 <= |f| < 1e21`, exponent form (`1e+21`,
/// `1.5e-7`) outside it. Non-finite values print by name.
pub(crate) fn push_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
        return;
    }
    if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    if f == 0.0 {
        out.push('0');
        return;
    }
    if f < 0.0 {
        out.push('-');
    }

    let mut buffer = ryu::Buffer::new();
    let shortest = buffer.format_finite(f.abs());
    let (mantissa, exponent) = match shortest.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse::<i32>().unwrap_or(0)),
        None => (shortest, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    // value = 0.<digits> * 10^point
    let all = int_part.bytes().chain(frac_part.bytes());
    let leading = all.clone().take_while(|b| *b == b'0').count();
    let mut digits: Vec<u8> = all.skip(leading).collect();
    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    let point = int_part.len() as i32 + exponent - leading as i32;
    let len = digits.len() as i32;

    if len <= point && point <= 21 {
        push_digits(out, &digits);
        out.extend(std::iter::repeat('0').take((point - len) as usize));
    } else if 0 < point && point <= 21 {
        let (head, tail) = digits.split_at(point as usize);
        push_digits(out, head);
        out.push('.');
        push_digits(out, tail);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        push_digits(out, &digits);
    } else {
        let (head, tail) = digits.split_at(1);
        push_digits(out, head);
        if !tail.is_empty() {
            out.push('.');
            push_digits(out, tail);
        }
        let exp = point - 1;
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(itoa::Buffer::new().format(exp.unsigned_abs()));
    }
}

fn push_digits(out: &mut String, digits: &[u8]) {
    out.extend(digits.iter().map(|b| *b as char));
}
