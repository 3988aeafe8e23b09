use super::*;

fn block(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect()
}

#[test]
fn test_encode_tab_and_newline_separated() {
    let text = encode(&block(&[&["X", "Y"], &["A", "B"]])).unwrap();
    assert_eq!(text, "X\tY\nA\tB");
}

#[test]
fn test_decode_block() {
    assert_eq!(decode("X\tY\nA\tB"), block(&[&["X", "Y"], &["A", "B"]]));
}

#[test]
fn test_decode_ignores_trailing_newline_and_crlf() {
    assert_eq!(decode("1\t2\r\n3\t4\r\n"), block(&[&["1", "2"], &["3", "4"]]));
}

#[test]
fn test_decode_empty() {
    assert!(decode("").is_empty());
}

#[test]
fn test_decode_keeps_empty_fields() {
    assert_eq!(decode("a\t\tc"), block(&[&["a", "", "c"]]));
}

#[test]
fn test_special_characters_survive() {
    let original = block(&[
        &["line one\nline two", "tab\there"],
        &["say \"hi\"", "[docs](https://example.com),[home](/)"],
    ]);
    let text = encode(&original).unwrap();
    assert_eq!(decode(&text), original);
}

#[test]
fn test_plain_values_are_not_quoted() {
    let text = encode(&block(&[&["node|2|true|false", "1,2,3"]])).unwrap();
    assert_eq!(text, "node|2|true|false\t1,2,3");
}

#[test]
fn test_ragged_rows() {
    let original = block(&[&["a", "b", "c"], &["d"]]);
    assert_eq!(decode(&encode(&original).unwrap()), original);
}

#[test]
fn test_decode_keeps_blank_rows() {
    assert_eq!(decode("A\n\nB"), block(&[&["A"], &[""], &["B"]]));
    assert_eq!(decode("A\r\n\r\nB\r\n"), block(&[&["A"], &[""], &["B"]]));
    assert_eq!(decode("\n1\t2"), block(&[&[""], &["1", "2"]]));
}

#[test]
fn test_decode_quoted_newline_is_not_a_row_break() {
    assert_eq!(
        decode("\"one\n\ntwo\"\tx\n\ny"),
        block(&[&["one\n\ntwo", "x"], &[""], &["y"]])
    );
    assert_eq!(decode("5\" screen\tok\nnext"), block(&[&["5\" screen", "ok"], &["next"]]));
}
