//! Tests for the decode module.

use super::record::fields_of;
use super::scalar::{parse_bool, parse_float, parse_signed, parse_unsigned};
use super::*;
use crate::record;
use std::collections::{BTreeMap, HashMap};

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn parse_root<T: Decode + Clone + Default>(vars: &HashMap<String, String>) -> Result<T, DecodeError> {
    let mut dest = T::default();
    parse(vars, &mut dest, &KeyPath::root())?;
    Ok(dest)
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Foo {
    a: i32,
    b: f32,
}
record!(Foo { a => "A", b => "B" });

#[derive(Debug, Clone, Default, PartialEq)]
struct Bar {
    c: String,
    d: Option<String>,
}
record!(Bar { c => "C", d => "D" });

#[derive(Debug, Clone, Default)]
struct Outer {
    e: Foo,
    f: Option<Box<Bar>>,
}
record!(Outer { e => "E", f => "F" });

#[derive(Debug, Clone, Default)]
struct Mixin {
    foo: Foo,
    bar: Option<Bar>,
}
record!(Mixin {
    #[embed] foo,
    #[embed] bar,
});

#[derive(Debug, Clone, Default)]
struct Maps {
    map: HashMap<String, String>,
}
record!(Maps { map => "Map" });

#[derive(Debug, Clone, Default)]
struct OptionalMaps {
    map: Option<BTreeMap<String, String>>,
}
record!(OptionalMaps { map => "Map" });

#[derive(Debug, Clone, Default)]
struct Limits {
    limits: HashMap<String, i64>,
    flags: BTreeMap<String, bool>,
}
record!(Limits {
    limits => "Limit",
    flags => "Flag",
});

#[derive(Debug, Clone, Default)]
struct Lists {
    strings: Vec<String>,
    ints: Vec<i64>,
    floats: Vec<f32>,
}
record!(Lists {
    strings => "Strings",
    ints => "Ints",
    floats => "Floats",
});

#[derive(Debug, Clone, Default)]
struct Book {
    name: Name,
    cat: Catalog,
}
record!(Book { name => "Name", cat => "Cat" });

#[derive(Debug, Clone, Default)]
struct Name {
    english: String,
    chinese: String,
}
record!(Name {
    english => "English",
    chinese => "Chinese",
});

#[derive(Debug, Clone, Default)]
struct Catalog {
    name: String,
    parent: Option<Box<Catalog>>,
}
record!(Catalog {
    name => "Name",
    parent => "Parent",
});

#[derive(Debug, Clone, Default)]
struct Numbers {
    small: i8,
    port: u16,
    big: u64,
    count: isize,
    ratio: f64,
    on: bool,
}
record!(Numbers { small, port, big, count, ratio, on });

#[derive(Debug, Clone, Default)]
struct Ordered {
    first: String,
    second: i32,
    third: String,
}
record!(Ordered { first, second, third });

#[derive(Debug, Clone, Default)]
struct WithHidden {
    visible: String,
    hidden: String,
}
record!(WithHidden {
    visible,
    #[skip] hidden,
});

#[derive(Debug, Clone, Default)]
struct Nested {
    rows: Vec<Vec<String>>,
}
record!(Nested { rows });

#[derive(Debug, Clone, Default)]
struct RecordMap {
    entries: HashMap<String, Foo>,
}
record!(RecordMap { entries });

#[derive(Debug, Clone, Default)]
struct Unit {
    marker: (),
}
record!(Unit { marker });

// ==================== KeyPath tests ====================

#[test]
fn test_key_path_join_keeps_order() {
    let path = KeyPath::new("PLUGIN").join("Cat").join("Parent").join("Name");
    assert_eq!(path.segments(), ["PLUGIN", "Cat", "Parent", "Name"]);
    assert_eq!(path.render("_"), "PLUGIN_Cat_Parent_Name");
    assert_eq!(path.to_string(), "PLUGIN.Cat.Parent.Name");
}

#[test]
fn test_key_path_empty_prefix_is_root() {
    assert!(KeyPath::new("").is_root());
    assert_eq!(KeyPath::new("").join("A").render("_"), "A");
}

#[test]
fn test_key_path_from_iter() {
    let path: KeyPath = ["A", "B"].into_iter().collect();
    assert_eq!(path.render("__"), "A__B");
}

// ==================== DataSource tests ====================

#[test]
fn test_map_source_lookup_is_exact() {
    let vars = env(&[("Map_A", "1")]);
    assert_eq!(vars.lookup(&KeyPath::new("Map").join("A")), Some("1".to_string()));
    assert_eq!(vars.lookup(&KeyPath::new("map").join("a")), None);
}

#[test]
fn test_map_source_find_prefix_strips_prefix() {
    let vars = env(&[("Map_A", "1"), ("Map_B_C", "2"), ("Mapping", "3"), ("Other_A", "4")]);
    let found = vars.find_prefix(&KeyPath::new("Map"));
    assert_eq!(found.len(), 2);
    assert_eq!(found["A"], "1");
    assert_eq!(found["B_C"], "2");
}

#[test]
fn test_env_source_insensitive_lookup() {
    let source = EnvSource::new(env(&[("PLUGIN_AUTO_COPY", "true")])).with_case(KeyCase::Insensitive);
    let value = source.lookup(&KeyPath::new("PLUGIN").join("auto_copy"));
    assert_eq!(value, Some("true".to_string()));
}

#[test]
fn test_env_source_exact_lookup_misses_other_case() {
    let source = EnvSource::new(env(&[("PLUGIN_TOKEN", "abc")]));
    assert_eq!(source.lookup(&KeyPath::new("PLUGIN").join("token")), None);
    assert_eq!(
        source.lookup(&KeyPath::new("PLUGIN").join("TOKEN")),
        Some("abc".to_string())
    );
}

#[test]
fn test_env_source_insensitive_prefix_keeps_stored_suffix() {
    let source = EnvSource::new(env(&[("PLUGIN_EXTRA_Level", "active"), ("OTHER", "x")]))
        .with_case(KeyCase::Insensitive);
    let found = source.find_prefix(&KeyPath::new("plugin").join("extra"));
    assert_eq!(found.len(), 1);
    assert_eq!(found["Level"], "active");
}

#[test]
fn test_env_source_custom_separator() {
    let source = EnvSource::new(env(&[("APP.db.host", "localhost")])).with_separator(".");
    let path = KeyPath::new("APP").join("db").join("host");
    assert_eq!(source.lookup(&path), Some("localhost".to_string()));
    assert_eq!(source.find_prefix(&KeyPath::new("APP")).len(), 1);
}

// ==================== Scalar tests ====================

#[test]
fn test_parse_bool_grammar() {
    for raw in ["true", "TRUE", "True", "t", "T", "1"] {
        assert_eq!(parse_bool(raw), Ok(true), "{}", raw);
    }
    for raw in ["false", "FALSE", "False", "f", "F", "0"] {
        assert_eq!(parse_bool(raw), Ok(false), "{}", raw);
    }
    assert!(parse_bool("yes").is_err());
    assert!(parse_bool(" true").is_err());
}

#[test]
fn test_parse_signed_radix_prefixes() {
    assert_eq!(parse_signed::<i64>("42"), Ok(42));
    assert_eq!(parse_signed::<i64>("-42"), Ok(-42));
    assert_eq!(parse_signed::<i64>("+7"), Ok(7));
    assert_eq!(parse_signed::<i64>("0x1F"), Ok(31));
    assert_eq!(parse_signed::<i64>("0X1f"), Ok(31));
    assert_eq!(parse_signed::<i64>("017"), Ok(15));
    assert_eq!(parse_signed::<i64>("0o17"), Ok(15));
    assert_eq!(parse_signed::<i64>("-0b101"), Ok(-5));
    assert_eq!(parse_signed::<i64>("1_000"), Ok(1000));
    assert_eq!(parse_signed::<i64>("0"), Ok(0));
}

#[test]
fn test_parse_signed_rejects_malformed() {
    for raw in ["", "abc", "1.5", "08", "0x", "1__0", "_1", "1_", " 1", "--1", "+-1"] {
        assert!(parse_signed::<i64>(raw).is_err(), "{:?}", raw);
    }
}

#[test]
fn test_parse_signed_range_checked() {
    assert_eq!(parse_signed::<i8>("127"), Ok(127));
    assert_eq!(parse_signed::<i8>("-128"), Ok(-128));
    assert!(parse_signed::<i8>("128").is_err());
    assert!(parse_signed::<i64>("9223372036854775808").is_err());
    assert_eq!(parse_signed::<i64>("-9223372036854775808"), Ok(i64::MIN));
}

#[test]
fn test_parse_unsigned() {
    assert_eq!(parse_unsigned::<u8>("255"), Ok(255));
    assert_eq!(parse_unsigned::<u8>("0xff"), Ok(255));
    assert!(parse_unsigned::<u8>("256").is_err());
    assert!(parse_unsigned::<u32>("-1").is_err());
    assert_eq!(parse_unsigned::<u64>("18446744073709551615"), Ok(u64::MAX));
}

#[test]
fn test_parse_float() {
    assert_eq!(parse_float("3"), Ok(3.0));
    assert_eq!(parse_float("-2.5"), Ok(-2.5));
    assert_eq!(parse_float("1e3"), Ok(1000.0));
    assert!(parse_float("1,5").is_err());
}

#[test]
fn test_scalar_fields_decode() {
    let vars = env(&[
        ("small", "-8"),
        ("port", "0x1F90"),
        ("big", "18446744073709551615"),
        ("count", "010"),
        ("ratio", "0.25"),
        ("on", "T"),
    ]);
    let numbers: Numbers = parse_root(&vars).unwrap();
    assert_eq!(numbers.small, -8);
    assert_eq!(numbers.port, 8080);
    assert_eq!(numbers.big, u64::MAX);
    assert_eq!(numbers.count, 8);
    assert_eq!(numbers.ratio, 0.25);
    assert!(numbers.on);
}

#[test]
fn test_scalar_out_of_range_names_field() {
    let vars = env(&[("small", "300")]);
    let err = parse_root::<Numbers>(&vars).unwrap_err();
    match err {
        DecodeError::Conversion { path, raw, shape, .. } => {
            assert_eq!(path, "small");
            assert_eq!(raw, "300");
            assert_eq!(shape, Shape::Integer { signed: true, bits: 8 });
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_f32_narrowing_is_range_checked() {
    let err = parse_root::<Foo>(&env(&[("B", "1e40")])).unwrap_err();
    match err {
        DecodeError::Conversion { path, shape, reason, .. } => {
            assert_eq!(path, "B");
            assert_eq!(shape, Shape::Float { bits: 32 });
            assert_eq!(reason, "value out of range");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let foo: Foo = parse_root(&env(&[("B", "1.5")])).unwrap();
    assert_eq!(foo.b, 1.5);
    let foo: Foo = parse_root(&env(&[("B", "-inf")])).unwrap();
    assert_eq!(foo.b, f32::NEG_INFINITY);
}

// ==================== Record tests ====================

#[test]
fn test_parse_flat_record() {
    let vars = env(&[("A", "1"), ("B", "3"), ("C", "CCC"), ("D", "DDD")]);
    let foo: Foo = parse_root(&vars).unwrap();
    assert_eq!(foo, Foo { a: 1, b: 3.0 });

    let bar: Bar = parse_root(&vars).unwrap();
    assert_eq!(bar.c, "CCC");
    assert_eq!(bar.d.as_deref(), Some("DDD"));
}

#[test]
fn test_parse_nested_records() {
    let vars = env(&[("E_A", "1"), ("E_B", "3"), ("F_C", "CCC"), ("F_D", "DDD")]);
    let outer: Outer = parse_root(&vars).unwrap();
    assert_eq!(outer.e, Foo { a: 1, b: 3.0 });
    let f = outer.f.expect("F should be allocated");
    assert_eq!(f.c, "CCC");
    assert_eq!(f.d.as_deref(), Some("DDD"));
}

#[test]
fn test_record_without_keys_is_left_untouched() {
    let vars = env(&[("F_C", "CCC")]);
    let mut outer = Outer {
        e: Foo { a: 7, b: 1.5 },
        f: None,
    };
    parse(&vars, &mut outer, &KeyPath::root()).unwrap();
    assert_eq!(outer.e, Foo { a: 7, b: 1.5 });
    assert_eq!(outer.f.unwrap().c, "CCC");
}

#[test]
fn test_nested_record_keeps_unaddressed_sub_fields() {
    let vars = env(&[("E_A", "1"), ("F_D", "DDD")]);
    let mut outer = Outer {
        e: Foo { a: 7, b: 1.5 },
        f: Some(Box::new(Bar {
            c: "keep".to_string(),
            d: None,
        })),
    };
    parse(&vars, &mut outer, &KeyPath::root()).unwrap();
    assert_eq!(outer.e, Foo { a: 1, b: 1.5 });
    let f = outer.f.unwrap();
    assert_eq!(f.c, "keep");
    assert_eq!(f.d.as_deref(), Some("DDD"));
}

#[test]
fn test_parse_into_boxed_record() {
    let vars = env(&[("A", "1"), ("B", "2.5")]);
    let mut boxed = Box::new(Foo { a: 0, b: 9.0 });
    parse(&vars, &mut boxed, &KeyPath::root()).unwrap();
    assert_eq!(*boxed, Foo { a: 1, b: 2.5 });

    let mut boxed = Box::new(Foo { a: 3, b: 4.0 });
    assert!(parse(&env(&[("A", "x")]), &mut boxed, &KeyPath::root()).is_err());
    assert_eq!(*boxed, Foo { a: 3, b: 4.0 });
}

#[test]
fn test_optional_record_absent_stays_none() {
    let vars = env(&[("E_A", "1")]);
    let outer: Outer = parse_root(&vars).unwrap();
    assert!(outer.f.is_none());
    assert_eq!(outer.e.a, 1);
    assert_eq!(outer.e.b, 0.0);
}

#[test]
fn test_nested_in_nested() {
    let vars = env(&[
        ("Name_English", "book"),
        ("Name_Chinese", "书"),
        ("Cat_Name", "Aa1分类"),
        ("Cat_Parent_Name", "Aa分类"),
        ("Cat_Parent_Parent_Name", "A分类"),
    ]);
    let book: Book = parse_root(&vars).unwrap();
    assert_eq!(book.name.english, "book");
    assert_eq!(book.name.chinese, "书");
    assert_eq!(book.cat.name, "Aa1分类");
    let parent = book.cat.parent.expect("parent");
    assert_eq!(parent.name, "Aa分类");
    let grandparent = parent.parent.expect("grandparent");
    assert_eq!(grandparent.name, "A分类");
    assert!(grandparent.parent.is_none());
}

#[test]
fn test_embedded_records_share_prefix() {
    let vars = env(&[("A", "1"), ("B", "3"), ("C", "CCC"), ("D", "DDD")]);
    let mixin: Mixin = parse_root(&vars).unwrap();
    assert_eq!(mixin.foo, Foo { a: 1, b: 3.0 });
    let bar = mixin.bar.expect("embedded optional should be allocated");
    assert_eq!(bar.c, "CCC");
    assert_eq!(bar.d.as_deref(), Some("DDD"));
}

#[test]
fn test_embedded_optional_not_allocated_without_data() {
    let vars = env(&[("A", "1")]);
    let mixin: Mixin = parse_root(&vars).unwrap();
    assert_eq!(mixin.foo.a, 1);
    assert!(mixin.bar.is_none());
}

#[test]
fn test_embedded_under_prefix() {
    let vars = env(&[("PLUGIN_A", "5"), ("PLUGIN_D", "x"), ("A", "9")]);
    let mut mixin = Mixin::default();
    parse(&vars, &mut mixin, &KeyPath::new("PLUGIN")).unwrap();
    assert_eq!(mixin.foo.a, 5);
    assert_eq!(mixin.bar.unwrap().d.as_deref(), Some("x"));
}

#[test]
fn test_unexported_field_never_written() {
    let vars = env(&[("visible", "yes"), ("hidden", "leak")]);
    let mut dest = WithHidden {
        visible: String::new(),
        hidden: "kept".to_string(),
    };
    parse(&vars, &mut dest, &KeyPath::root()).unwrap();
    assert_eq!(dest.visible, "yes");
    assert_eq!(dest.hidden, "kept");
}

#[test]
fn test_descriptor_lists_fields_in_order() {
    let fields = fields_of::<Mixin>();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "foo");
    assert!(fields[0].embedded);
    assert_eq!(fields[0].shape, Shape::Record("Foo"));
    assert_eq!(fields[1].shape, Shape::Optional(Box::new(Shape::Record("Bar"))));

    let fields = fields_of::<WithHidden>();
    assert!(fields[0].exported);
    assert!(!fields[1].exported);

    let fields = fields_of::<Catalog>();
    assert_eq!(fields[0].name, "Name");
    assert_eq!(fields[0].shape, Shape::Text);
    assert_eq!(fields[1].shape, Shape::Optional(Box::new(Shape::Record("Catalog"))));
}

// ==================== Sequence tests ====================

#[test]
fn test_sequences() {
    let vars = env(&[("Strings", "A,B,C"), ("Ints", "1,2,3"), ("Floats", "1,2,3"), ("D", "DDD")]);
    let lists: Lists = parse_root(&vars).unwrap();
    assert_eq!(lists.strings, vec!["A", "B", "C"]);
    assert_eq!(lists.ints, vec![1, 2, 3]);
    assert_eq!(lists.floats, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_sequence_tokens_not_trimmed() {
    let vars = env(&[("Strings", "A,,B ")]);
    let lists: Lists = parse_root(&vars).unwrap();
    assert_eq!(lists.strings, vec!["A", "", "B "]);

    let vars = env(&[("Ints", "1, 2")]);
    assert!(parse_root::<Lists>(&vars).is_err());
}

#[test]
fn test_sequence_failure_aborts_field() {
    let vars = env(&[("Strings", "x"), ("Ints", "1,two,3")]);
    let mut lists = Lists::default();
    let err = parse(&vars, &mut lists, &KeyPath::root()).unwrap_err();
    assert!(matches!(err, DecodeError::Conversion { ref raw, .. } if raw == "two"));
    assert!(lists.ints.is_empty());
    assert!(lists.strings.is_empty());
}

#[test]
fn test_sequence_of_non_scalar_is_unsupported() {
    let vars = env(&[("rows", "a,b")]);
    let err = parse_root::<Nested>(&vars).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnsupportedShape {
            path: "rows".to_string(),
            shape: Shape::Sequence(Box::new(Shape::Sequence(Box::new(Shape::Text)))),
        }
    );
}

// ==================== Mapping tests ====================

#[test]
fn test_text_mapping() {
    let vars = env(&[("Map_A", "1"), ("Map_B", "3"), ("Map_C", "CCC"), ("Map_D", "DDD")]);
    let maps: Maps = parse_root(&vars).unwrap();
    assert_eq!(maps.map.len(), 4);
    assert_eq!(maps.map["A"], "1");
    assert_eq!(maps.map["B"], "3");
    assert_eq!(maps.map["C"], "CCC");
    assert_eq!(maps.map["D"], "DDD");
}

#[test]
fn test_optional_mapping() {
    let vars = env(&[("Map_A", "1"), ("Map_B", "3")]);
    let maps: OptionalMaps = parse_root(&vars).unwrap();
    let map = maps.map.expect("map");
    assert_eq!(map.keys().collect::<Vec<_>>(), ["A", "B"]);

    let maps: OptionalMaps = parse_root(&env(&[])).unwrap();
    assert!(maps.map.is_none());
}

#[test]
fn test_converted_mapping_values() {
    let vars = env(&[("Limit_cpu", "0x10"), ("Limit_mem", "512"), ("Flag_fast", "t")]);
    let limits: Limits = parse_root(&vars).unwrap();
    assert_eq!(limits.limits["cpu"], 16);
    assert_eq!(limits.limits["mem"], 512);
    assert!(limits.flags["fast"]);
}

#[test]
fn test_mapping_conversion_failure_aborts_field() {
    let vars = env(&[("Limit_cpu", "1"), ("Limit_mem", "lots")]);
    let err = parse_root::<Limits>(&vars).unwrap_err();
    assert_eq!(err.path(), Some("Limit.mem"));
}

#[test]
fn test_mapping_of_records_is_unsupported() {
    let vars = env(&[("entries_x_A", "1")]);
    let err = parse_root::<RecordMap>(&vars).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedShape { ref path, .. } if path == "entries"));
}

#[test]
fn test_unit_field_is_unsupported_even_without_data() {
    let err = parse_root::<Unit>(&env(&[])).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnsupportedShape {
            path: "marker".to_string(),
            shape: Shape::Unsupported("()"),
        }
    );
}

// ==================== Entry point tests ====================

#[test]
fn test_parse_requires_record_destination() {
    let vars = env(&[("A", "1")]);

    let mut number = 1i32;
    let err = parse(&vars, &mut number, &KeyPath::root()).unwrap_err();
    assert!(matches!(err, DecodeError::Precondition(_)));
    assert_eq!(number, 1);

    let mut text = String::new();
    assert!(matches!(
        parse(&vars, &mut text, &KeyPath::root()),
        Err(DecodeError::Precondition(_))
    ));

    let mut map: HashMap<String, String> = HashMap::new();
    assert!(matches!(
        parse(&vars, &mut map, &KeyPath::root()),
        Err(DecodeError::Precondition(_))
    ));
}

#[test]
fn test_malformed_integer_fails_whole_parse_atomically() {
    let vars = env(&[("first", "one"), ("second", "nope"), ("third", "three")]);
    let mut dest = Ordered {
        first: "default".to_string(),
        second: 2,
        third: "default".to_string(),
    };
    let err = parse(&vars, &mut dest, &KeyPath::root()).unwrap_err();
    match err {
        DecodeError::Conversion { ref path, ref raw, .. } => {
            assert_eq!(path, "second");
            assert_eq!(raw, "nope");
        }
        ref other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("second"));
    assert_eq!(dest.first, "default");
    assert_eq!(dest.second, 2);
    assert_eq!(dest.third, "default");
}

#[test]
fn test_missing_fields_keep_caller_defaults() {
    let vars = env(&[("second", "5")]);
    let mut dest = Ordered {
        first: "keep".to_string(),
        second: 0,
        third: "also".to_string(),
    };
    parse(&vars, &mut dest, &KeyPath::root()).unwrap();
    assert_eq!(dest.first, "keep");
    assert_eq!(dest.second, 5);
    assert_eq!(dest.third, "also");
}

#[test]
fn test_parse_with_env_source_and_prefix() {
    let source = EnvSource::new(env(&[("PLUGIN_FIRST", "a"), ("PLUGIN_SECOND", "-3")]))
        .with_case(KeyCase::Insensitive);
    let mut dest = Ordered::default();
    parse(&source, &mut dest, &KeyPath::new("PLUGIN")).unwrap();
    assert_eq!(dest.first, "a");
    assert_eq!(dest.second, -3);
    assert_eq!(dest.third, "");
}
