use std::{error::Error, fs, path::PathBuf};

use domson::{
    parser::{parse, parse_object},
    printer::{to_json, to_json_with, PrintSettings},
    value::{Kind, Value},
};

type TestResult = Result<(), Box<dyn Error>>;

fn get_test_data_file_path() -> PathBuf {
    // Get path of test file, see https://stackoverflow.com/a/30004252
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/test_data.json");
    path
}

fn read_test_data() -> Result<Vec<u8>, Box<dyn Error>> {
    Ok(fs::read(get_test_data_file_path())?)
}

#[test]
fn navigates_test_data() -> TestResult {
    let doc = parse(&read_test_data()?)?;

    assert_eq!(Kind::Object, doc.kind());
    assert_eq!("test data", doc.str_at_key("name", "?"));
    assert_eq!(3.0, doc.f64_at_key("version", 0.0));
    assert_eq!(3, doc.at_key("version").to_u64_or(0));
    assert_eq!(true, doc.bool_at_key("enabled", false));
    assert_eq!(false, doc.bool_at_key("disabled", true));
    assert_eq!(true, doc.at_key("nothing").is_null());
    assert_eq!(0, doc.at_key("empty_object").object_len());
    assert_eq!(0, doc.at_key("empty_array").array_len());

    let numbers = doc.at_key("numbers");
    assert_eq!(7, numbers.array_len());
    assert_eq!(0.0, numbers.f64_at_index(0, -1.0));
    assert_eq!(-1.0, numbers.f64_at_index(2, 0.0));
    assert_eq!(0.5, numbers.f64_at_index(3, 0.0));
    assert_eq!(0.015, numbers.f64_at_index(5, 0.0));
    assert_eq!(9007199254740991.0, numbers.f64_at_index(6, 0.0));
    assert_eq!(7, numbers.elements_of_kind(Kind::Number).count());

    let strings = doc.at_key("strings");
    assert_eq!("hello world", strings.str_at_key("plain", ""));
    assert_eq!(
        "quote:\" backslash:\\ slash:/ tab:\t newline:\n",
        strings.str_at_key("escapes", "")
    );
    assert_eq!("Aé中", strings.str_at_key("unicode", ""));
    assert_eq!("héllo wörld 中文", strings.str_at_key("raw_utf8", ""));

    let nested = doc.at_key("nested");
    assert_eq!(2, nested.elements_of_kind(Kind::Object).count());
    assert_eq!(1.0, nested.at_index(0).f64_at_key("id", 0.0));
    assert_eq!("b", nested.at_index(0).at_key("tags").str_at_index(1, ""));
    assert_eq!(0, nested.at_index(1).at_key("tags").array_len());

    // The root is an object, so the typed entry point accepts it too
    let map = parse_object(&read_test_data()?)?;
    assert_eq!(true, map.contains_key("name"));
    Ok(())
}

#[test]
fn round_trips_test_data() -> TestResult {
    let doc = parse(&read_test_data()?)?;

    let pretty = to_json(&doc);
    assert_eq!(doc, parse(pretty.as_bytes())?);

    let minified = to_json_with(&doc, &PrintSettings::minified());
    assert_eq!(doc, parse(minified.as_bytes())?);

    // Minified output is a fixed point of parse-then-print
    let minified_again = to_json_with(&parse(minified.as_bytes())?, &PrintSettings::minified());
    assert_eq!(minified, minified_again);
    Ok(())
}

#[test]
fn mutated_tree_survives_round_trip() -> TestResult {
    let mut doc = parse(&read_test_data()?)?;

    doc.set_key("version", 4.0)?;
    doc.take_key("disabled")?;
    doc.get_key_mut("nested")
        .ok_or("nested missing")?
        .push(Value::from("extra"))?;

    let reparsed = parse(to_json(&doc).as_bytes())?;
    assert_eq!(doc, reparsed);
    assert_eq!(4.0, reparsed.f64_at_key("version", 0.0));
    assert_eq!(false, reparsed.has_key("disabled"));
    assert_eq!("extra", reparsed.at_key("nested").str_at_index(2, ""));
    Ok(())
}

#[test]
fn output_matches_independent_parser() -> TestResult {
    let data = read_test_data()?;
    let doc = parse(&data)?;

    let expected: serde_json::Value = serde_json::from_slice(&data)?;
    let minified: serde_json::Value =
        serde_json::from_str(&to_json_with(&doc, &PrintSettings::minified()))?;
    let pretty: serde_json::Value = serde_json::from_str(&to_json(&doc))?;

    assert_eq!(expected, minified);
    assert_eq!(expected, pretty);
    Ok(())
}
