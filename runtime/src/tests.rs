use super::*;

fn array_of(items: &[Value]) -> Value {
    items
        .iter()
        .cloned()
        .fold(new_array(), arr_push_result)
}

fn rendered(v: Value) -> String {
    v.to_string()
}

#[test]
fn test_tags() {
    assert_eq!(NULL.tag() as u8, 0);
    assert_eq!(num(1.0).tag() as u8, 1);
    assert_eq!(string("a").tag() as u8, 2);
    assert_eq!(new_array().tag() as u8, 3);
}

#[test]
fn test_truthiness() {
    assert!(!truthy(NULL));
    assert!(!truthy(num(0.0)));
    assert!(truthy(num(-2.0)));
    assert!(!truthy(string("")));
    assert!(truthy(string("x")));
    // Arrays are never true, not even when non-empty.
    assert!(!truthy(array_of(&[num(1.0)])));
}

#[test]
fn test_add() {
    assert_eq!(rendered(add(num(2.0), num(3.0))), "5");
    assert_eq!(rendered(add(string("a"), string("b"))), "ab");
    assert_eq!(rendered(add(string("1"), string("2"))), "12");

    let joined = add(array_of(&[num(1.0)]), array_of(&[num(2.0), num(3.0)]));
    assert_eq!(rendered(joined), "[1, 2, 3]");

    assert_eq!(
        try_add(num(1.0), string("a")).unwrap_err(),
        RuntimeError::MismatchedAdd
    );
    assert_eq!(
        try_add(NULL, NULL).unwrap_err().to_string(),
        "Cannot add mismatched types."
    );
}

#[test]
fn test_numeric_operators() {
    assert_eq!(rendered(sub(num(5.0), num(7.0))), "-2");
    assert_eq!(rendered(mul(num(1.5), num(4.0))), "6");
    assert_eq!(rendered(div(num(1.0), num(4.0))), "0.25");
    assert_eq!(rendered(rem(num(-7.0), num(3.0))), "-1");
    assert_eq!(rendered(neg(num(3.0))), "-3");

    assert_eq!(
        try_sub(string("a"), num(1.0)).unwrap_err().to_string(),
        "'-' requires Numbers."
    );
    assert_eq!(
        try_rem(num(1.0), NULL).unwrap_err().to_string(),
        "'%' requires Numbers."
    );
    assert_eq!(
        try_neg(string("a")).unwrap_err().to_string(),
        "'-' requires Number."
    );
}

#[test]
fn test_logic() {
    assert_eq!(not(NULL).number(), 1.0);
    assert_eq!(not(string("x")).number(), 0.0);
    assert_eq!(and(num(1.0), string("x")).number(), 1.0);
    assert_eq!(and(num(1.0), NULL).number(), 0.0);
    assert_eq!(or(NULL, num(2.0)).number(), 1.0);
    assert_eq!(or(NULL, string("")).number(), 0.0);
}

#[test]
fn test_equality() {
    assert_eq!(eq(NULL, NULL).number(), 1.0);
    assert_eq!(eq(num(1.0), num(1.0)).number(), 1.0);
    assert_eq!(eq(num(1.0), string("1")).number(), 0.0);
    assert_eq!(eq(string("ab"), string("ab")).number(), 1.0);
    assert_eq!(neq(string("ab"), string("ba")).number(), 1.0);

    // Arrays compare by their numeric field, always zero: any two arrays are
    // equal, whatever their contents.
    let a = array_of(&[num(1.0), num(2.0)]);
    let b = array_of(&[string("x")]);
    assert_eq!(eq(a.clone(), b.clone()).number(), 1.0);
    assert_eq!(neq(a, b).number(), 0.0);
}

#[test]
fn test_ordering_reads_numeric_field() {
    assert_eq!(lt(num(1.0), num(2.0)).number(), 1.0);
    assert_eq!(gt(num(1.0), num(2.0)).number(), 0.0);
    assert_eq!(lte(num(2.0), num(2.0)).number(), 1.0);
    assert_eq!(gte(num(1.0), num(2.0)).number(), 0.0);
    // Strings read as zero.
    assert_eq!(lt(string("9"), num(1.0)).number(), 1.0);
    assert_eq!(gte(string("b"), string("a")).number(), 1.0);
}

#[test]
fn test_array_growth() {
    let list = new_array();
    let array = list.as_array().cloned().unwrap();
    assert_eq!(array.capacity(), 4);

    for i in 0..4 {
        arr_push(list.clone(), num(f64::from(i)));
    }
    assert_eq!(array.capacity(), 4);

    arr_push(list.clone(), num(4.0));
    assert_eq!(array.len(), 5);
    assert_eq!(array.capacity(), 8);
    assert_eq!(rendered(list), "[0, 1, 2, 3, 4]");

    let big = array.concat(&array);
    assert_eq!(big.len(), 10);
    assert_eq!(big.capacity(), 16);
}

#[test]
fn test_array_operations() {
    let list = array_of(&[num(10.0), num(20.0), num(30.0)]);

    assert_eq!(rendered(arr_get(list.clone(), 1)), "20");
    assert_eq!(rendered(arr_get(list.clone(), 3)), "NULL");
    assert_eq!(rendered(arr_get(list.clone(), -1)), "NULL");
    assert_eq!(rendered(arr_get(num(1.0), 0)), "NULL");

    arr_replace(list.clone(), 0, string("a"));
    arr_replace(list.clone(), 9, string("ignored"));
    assert_eq!(rendered(list.clone()), "[a, 20, 30]");

    arr_insert(list.clone(), 1, num(15.0));
    arr_insert(list.clone(), 4, num(40.0));
    arr_insert(list.clone(), 9, num(99.0));
    assert_eq!(rendered(list.clone()), "[a, 15, 20, 30, 40]");

    arr_remove(list.clone(), 0);
    arr_remove(list.clone(), 7);
    assert_eq!(rendered(list.clone()), "[15, 20, 30, 40]");

    let joined = arr_concat(list.clone(), array_of(&[NULL]));
    assert_eq!(rendered(joined), "[15, 20, 30, 40, NULL]");
    assert_eq!(rendered(arr_concat(list.clone(), num(1.0))), "NULL");
    assert_eq!(rendered(arr_push_result(num(1.0), num(2.0))), "NULL");

    assert_eq!(rendered(len(list)), "4");
}

#[test]
fn test_arrays_are_shared() {
    let a = new_array();
    let b = a.clone();
    arr_push(b, num(1.0));
    assert_eq!(rendered(a), "[1]");
}

#[test]
fn test_stringify() {
    assert_eq!(rendered(stringify(NULL)), "NULL");
    assert_eq!(rendered(stringify(num(42.0))), "42");
    assert_eq!(rendered(stringify(string("s"))), "s");

    let nested = array_of(&[num(1.0), array_of(&[string("a"), NULL]), array_of(&[])]);
    assert_eq!(rendered(stringify(nested)), "[1, [a, NULL], []]");
}

#[test]
fn test_format_number() {
    let cases = [
        (0.0, "0"),
        (5.0, "5"),
        (-7.0, "-7"),
        (2.5, "2.5"),
        (0.1, "0.1"),
        (1.0 / 3.0, "0.333333"),
        (3.141_592_65, "3.14159"),
        (123_456.0, "123456"),
        (1_234_567.0, "1.23457e+06"),
        (1e6, "1e+06"),
        (0.0001, "0.0001"),
        (0.000_012_5, "1.25e-05"),
        (1e100, "1e+100"),
        (f64::INFINITY, "inf"),
    ];
    for (n, expected) in cases {
        assert_eq!(format_number(n), expected, "formatting {n:?}");
    }
}

#[test]
fn test_to_num() {
    let cases = [
        ("42", 42.0),
        ("  -3.5xyz", -3.5),
        ("+.5", 0.5),
        ("1e3", 1000.0),
        ("1e", 1.0),
        ("7.", 7.0),
        ("abc", 0.0),
        ("", 0.0),
        ("-", 0.0),
        (".", 0.0),
    ];
    for (s, expected) in cases {
        assert_eq!(to_num(string(s)).number(), expected, "parsing {s:?}");
    }
    assert_eq!(to_num(num(3.0)).number(), 3.0);
    assert_eq!(to_num(NULL).number(), 0.0);
    assert_eq!(to_num(new_array()).number(), 0.0);
}

#[test]
fn test_len() {
    assert_eq!(len(string("hello")).number(), 5.0);
    assert_eq!(len(num(12.0)).number(), 0.0);
    assert_eq!(len(NULL).number(), 0.0);
}

#[test]
fn test_index() {
    assert_eq!(index(num(2.9)), 2);
    assert_eq!(index(num(-1.5)), -1);
    assert_eq!(index(string("3")), 0);
}

#[test]
fn test_console_output() {
    let out = capture(|| {
        print(string("a"));
        println(string("b"));
        println(stringify(add(num(2.0), num(3.0))));
    });
    assert_eq!(out, "ab\n5\n");

    assert_eq!(
        try_print(&num(1.0)).unwrap_err().to_string(),
        "Cannot print non-String types. Use Str(val)."
    );
}

#[test]
fn test_console_escapes() {
    let out = capture(|| {
        clear();
        set_title(string("Game"));
        set_title(num(1.0));
        color(num(4.0));
        color(num(10.0));
        color(num(7.0));
    });
    assert_eq!(out, "\x1b[2J\x1b[H\x1b]0;Game\x07\x1b[31m\x1b[92m\x1b[37m");
}

#[test]
fn test_input() {
    let mut reader = "Ada\r\nrest\n".as_bytes();
    let mut answer = NULL;
    let out = capture(|| answer = input_from(string("Name? "), &mut reader));
    assert_eq!(out, "Name? ");
    assert_eq!(rendered(answer), "Ada");

    let mut reader = "rest".as_bytes();
    let answer = input_from(string(""), &mut reader);
    assert_eq!(rendered(answer), "rest");

    let mut empty: &[u8] = &[];
    assert_eq!(input_from(string(""), &mut empty).tag(), Tag::Null);
}
