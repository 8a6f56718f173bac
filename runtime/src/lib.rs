//! Runtime support for programs generated by the Titan compiler.
//!
//! Generated programs include this file as their `titan_runtime` module and
//! call into it for every value operation.

#![allow(dead_code)]

use std::{
    cell::RefCell,
    convert::TryFrom,
    fmt,
    io::{self, BufRead, Write},
    process,
    rc::Rc,
};

/// A dynamically typed Titan value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    Str(Rc<str>),
    Array(Array),
}

/// Numeric tags of each kind of value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Null = 0,
    Number = 1,
    String = 2,
    Array = 3,
}

pub const NULL: Value = Value::Null;

impl Value {
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Number(_) => Tag::Number,
            Value::Str(_) => Tag::String,
            Value::Array(_) => Tag::Array,
        }
    }

    /// The numeric field of the value, which is zero for anything but
    /// numbers.
    pub fn number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            _ => 0.0,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::Array(array) => {
                f.write_str("[")?;
                for (i, item) in array.0.borrow().items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn string(s: &str) -> Value {
    Value::Str(Rc::from(s))
}

/// Null is false, numbers are true when non-zero and strings when non-empty.
/// Arrays are never true.
pub fn truthy(v: Value) -> bool {
    match v {
        Value::Null | Value::Array(_) => false,
        Value::Number(n) => n != 0.0,
        Value::Str(s) => !s.is_empty(),
    }
}

fn boolean(b: bool) -> Value {
    num(if b { 1.0 } else { 0.0 })
}

/// Converts the numeric field of a value into an array index, truncating.
#[allow(clippy::cast_possible_truncation)]
pub fn index(v: Value) -> i64 {
    v.number() as i64
}

//
// Arrays
//

const INITIAL_CAPACITY: usize = 4;

/// A growable array, shared by every value that refers to it.
#[derive(Clone, Debug)]
pub struct Array(Rc<RefCell<ArrayBuf>>);

#[derive(Debug)]
struct ArrayBuf {
    items: Vec<Value>,
    /// Logical capacity. It starts at 4 and doubles while an append would
    /// exceed it.
    capacity: usize,
}

impl ArrayBuf {
    fn ensure_space(&mut self, additional: usize) {
        let needed = self.items.len() + additional;
        if needed > self.capacity {
            while needed > self.capacity {
                self.capacity *= 2;
            }
            self.items.reserve(self.capacity - self.items.len());
        }
    }

    fn position(&self, index: i64) -> Option<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.items.len())
    }
}

impl Array {
    pub fn new() -> Array {
        Array(Rc::new(RefCell::new(ArrayBuf {
            items: Vec::with_capacity(INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
        })))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.0.borrow().capacity
    }

    pub fn push(&self, item: Value) {
        let mut buf = self.0.borrow_mut();
        buf.ensure_space(1);
        buf.items.push(item);
    }

    pub fn get(&self, index: i64) -> Option<Value> {
        let buf = self.0.borrow();
        buf.position(index).map(|i| buf.items[i].clone())
    }

    pub fn replace(&self, index: i64, item: Value) -> bool {
        let mut buf = self.0.borrow_mut();
        match buf.position(index) {
            Some(i) => {
                buf.items[i] = item;
                true
            }
            None => false,
        }
    }

    /// Inserts at `index`, which may be the current length (an append).
    pub fn insert(&self, index: i64, item: Value) -> bool {
        let mut buf = self.0.borrow_mut();
        let Some(i) = usize::try_from(index)
            .ok()
            .filter(|&i| i <= buf.items.len())
        else {
            return false;
        };
        buf.ensure_space(1);
        buf.items.insert(i, item);
        true
    }

    pub fn remove(&self, index: i64) -> Option<Value> {
        let mut buf = self.0.borrow_mut();
        let i = buf.position(index)?;
        Some(buf.items.remove(i))
    }

    /// Builds a new array with the items of `self` followed by the ones of
    /// `other`.
    pub fn concat(&self, other: &Array) -> Array {
        let result = Array::new();
        {
            let mut buf = result.0.borrow_mut();
            let a = self.0.borrow();
            let b = other.0.borrow();
            buf.ensure_space(a.items.len() + b.items.len());
            buf.items.extend(a.items.iter().cloned());
            buf.items.extend(b.items.iter().cloned());
        }
        result
    }
}

impl Default for Array {
    fn default() -> Self {
        Array::new()
    }
}

pub fn new_array() -> Value {
    Value::Array(Array::new())
}

/// Appends `item` and returns the array itself, so array literals can be
/// built as a single expression. Returns null if `list` is not an array.
pub fn arr_push_result(list: Value, item: Value) -> Value {
    match list {
        Value::Array(array) => {
            array.push(item);
            Value::Array(array)
        }
        _ => NULL,
    }
}

pub fn arr_push(list: Value, item: Value) -> Value {
    if let Value::Array(array) = list {
        array.push(item);
    }
    NULL
}

pub fn arr_get(list: Value, index: i64) -> Value {
    list.as_array()
        .and_then(|array| array.get(index))
        .unwrap_or(NULL)
}

pub fn arr_replace(list: Value, index: i64, item: Value) -> Value {
    if let Value::Array(array) = list {
        array.replace(index, item);
    }
    NULL
}

pub fn arr_insert(list: Value, index: i64, item: Value) -> Value {
    if let Value::Array(array) = list {
        array.insert(index, item);
    }
    NULL
}

pub fn arr_remove(list: Value, index: i64) -> Value {
    if let Value::Array(array) = list {
        array.remove(index);
    }
    NULL
}

pub fn arr_concat(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Array(a), Value::Array(b)) => Value::Array(a.concat(&b)),
        _ => NULL,
    }
}

//
// Conversions
//

#[allow(clippy::cast_precision_loss)]
pub fn len(v: Value) -> Value {
    match v {
        Value::Array(array) => num(array.len() as f64),
        Value::Str(s) => num(s.len() as f64),
        _ => num(0.0),
    }
}

pub fn stringify(v: Value) -> Value {
    match v {
        Value::Str(_) => v,
        _ => string(&v.to_string()),
    }
}

pub fn to_num(v: Value) -> Value {
    match v {
        Value::Number(_) => v,
        Value::Str(s) => num(parse_number_prefix(&s)),
        _ => num(0.0),
    }
}

/// Formats a number as C's `%g` does: six significant digits, trailing
/// zeros removed, and exponent notation for very large or small magnitudes.
pub fn format_number(n: f64) -> String {
    const PRECISION: i32 = 6;

    if n.is_nan() {
        return if n.is_sign_negative() { "-nan" } else { "nan" }.to_owned();
    }
    if n.is_infinite() {
        return if n < 0.0 { "-inf" } else { "inf" }.to_owned();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    let scientific = format!("{n:.5e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(PRECISION - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{n:.decimals$}")).to_owned()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Parses the longest numeric prefix of `s`, as C's `atof` does. Yields zero
/// if there is none.
pub fn parse_number_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digits += frac_end - (end + 1);
        end = frac_end;
    }
    if digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

//
// Arithmetic and logic
//

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    MismatchedAdd,
    /// A binary operator applied to something other than two numbers.
    RequiresNumbers(char),
    /// A unary operator applied to something other than a number.
    RequiresNumber(char),
    PrintNonString,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::MismatchedAdd => write!(f, "Cannot add mismatched types."),
            RuntimeError::RequiresNumbers(op) => write!(f, "'{op}' requires Numbers."),
            RuntimeError::RequiresNumber(op) => write!(f, "'{op}' requires Number."),
            RuntimeError::PrintNonString => {
                write!(f, "Cannot print non-String types. Use Str(val).")
            }
        }
    }
}

/// Reports a runtime error and terminates the program.
fn fail(error: RuntimeError) -> ! {
    emit(&format!("RUNTIME ERROR: {error}\n"));
    flush();
    process::exit(1);
}

pub fn try_add(a: Value, b: Value) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => Ok(num(a + b)),
        (Value::Str(a), Value::Str(b)) => Ok(string(&format!("{a}{b}"))),
        (Value::Array(a), Value::Array(b)) => Ok(Value::Array(a.concat(&b))),
        _ => Err(RuntimeError::MismatchedAdd),
    }
}

fn numeric(
    op: char,
    a: &Value,
    b: &Value,
    f: impl FnOnce(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => Ok(num(f(*a, *b))),
        _ => Err(RuntimeError::RequiresNumbers(op)),
    }
}

pub fn try_sub(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric('-', &a, &b, |a, b| a - b)
}

pub fn try_mul(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric('*', &a, &b, |a, b| a * b)
}

pub fn try_div(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric('/', &a, &b, |a, b| a / b)
}

/// Remainder with the sign of the dividend, as C's `fmod`.
pub fn try_rem(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric('%', &a, &b, |a, b| a % b)
}

pub fn try_neg(a: Value) -> Result<Value, RuntimeError> {
    match a {
        Value::Number(n) => Ok(num(-n)),
        _ => Err(RuntimeError::RequiresNumber('-')),
    }
}

pub fn add(a: Value, b: Value) -> Value {
    try_add(a, b).unwrap_or_else(|e| fail(e))
}

pub fn sub(a: Value, b: Value) -> Value {
    try_sub(a, b).unwrap_or_else(|e| fail(e))
}

pub fn mul(a: Value, b: Value) -> Value {
    try_mul(a, b).unwrap_or_else(|e| fail(e))
}

pub fn div(a: Value, b: Value) -> Value {
    try_div(a, b).unwrap_or_else(|e| fail(e))
}

pub fn rem(a: Value, b: Value) -> Value {
    try_rem(a, b).unwrap_or_else(|e| fail(e))
}

pub fn neg(a: Value) -> Value {
    try_neg(a).unwrap_or_else(|e| fail(e))
}

pub fn not(a: Value) -> Value {
    boolean(!truthy(a))
}

/// Both operands are always evaluated.
pub fn and(a: Value, b: Value) -> Value {
    boolean(truthy(a) & truthy(b))
}

pub fn or(a: Value, b: Value) -> Value {
    boolean(truthy(a) | truthy(b))
}

//
// Comparisons
//

/// Values of different kinds are never equal. Arrays compare by their
/// numeric field, which is always zero, so any two arrays are equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a.tag() != b.tag() {
        return false;
    }
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Str(a), Value::Str(b)) => a == b,
        _ => a.number() == b.number(),
    }
}

pub fn eq(a: Value, b: Value) -> Value {
    boolean(values_equal(&a, &b))
}

pub fn neq(a: Value, b: Value) -> Value {
    boolean(!values_equal(&a, &b))
}

// Ordering reads the numeric field whatever the kind of the operands.

pub fn lt(a: Value, b: Value) -> Value {
    boolean(a.number() < b.number())
}

pub fn gt(a: Value, b: Value) -> Value {
    boolean(a.number() > b.number())
}

pub fn lte(a: Value, b: Value) -> Value {
    boolean(a.number() <= b.number())
}

pub fn gte(a: Value, b: Value) -> Value {
    boolean(a.number() >= b.number())
}

//
// Console
//

#[cfg(test)]
thread_local! {
    static CAPTURED: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Runs `f`, returning everything it wrote to the console.
#[cfg(test)]
pub(crate) fn capture(f: impl FnOnce()) -> String {
    CAPTURED.with(|c| *c.borrow_mut() = Some(String::new()));
    f();
    CAPTURED.with(|c| c.borrow_mut().take().unwrap_or_default())
}

fn emit(text: &str) {
    #[cfg(test)]
    {
        let captured = CAPTURED.with(|c| match c.borrow_mut().as_mut() {
            Some(buf) => {
                buf.push_str(text);
                true
            }
            None => false,
        });
        if captured {
            return;
        }
    }
    // Nothing sensible can be done if the console is gone.
    let _ = io::stdout().lock().write_all(text.as_bytes());
}

fn flush() {
    let _ = io::stdout().flush();
}

pub fn try_print(v: &Value) -> Result<(), RuntimeError> {
    match v {
        Value::Str(s) => {
            emit(s);
            Ok(())
        }
        _ => Err(RuntimeError::PrintNonString),
    }
}

pub fn print(v: Value) -> Value {
    try_print(&v).unwrap_or_else(|e| fail(e));
    NULL
}

pub fn println(v: Value) -> Value {
    print(v);
    emit("\n");
    NULL
}

/// Prints the prompt and reads one line from the standard input. Yields
/// null at the end of the input.
pub fn input(prompt: Value) -> Value {
    input_from(prompt, &mut io::stdin().lock())
}

pub fn input_from(prompt: Value, reader: &mut impl BufRead) -> Value {
    print(prompt);
    flush();
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) | Err(_) => NULL,
        Ok(_) => {
            for terminator in ['\n', '\r'] {
                if let Some(i) = line.find(terminator) {
                    line.truncate(i);
                }
            }
            string(&line)
        }
    }
}

pub fn clear() -> Value {
    emit("\x1b[2J\x1b[H");
    NULL
}

pub fn set_title(title: Value) -> Value {
    if let Value::Str(title) = title {
        emit(&format!("\x1b]0;{title}\x07"));
    }
    NULL
}

/// Sets the text color from a 4-bit console attribute, where blue is 1,
/// green is 2, red is 4 and intensity is 8.
pub fn color(attribute: Value) -> Value {
    if let Value::Number(n) = attribute {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let attribute = n as u8;
        let ansi = u8::from(attribute & 4 != 0)
            | u8::from(attribute & 2 != 0) << 1
            | u8::from(attribute & 1 != 0) << 2;
        let base = if attribute & 8 != 0 { 90 } else { 30 };
        emit(&format!("\x1b[{}m", base + ansi));
    }
    NULL
}

/// Waits for the user before the program exits.
pub fn pause() {
    emit("Press Enter to continue . . .");
    flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

#[cfg(test)]
mod tests;
