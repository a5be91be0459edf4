#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Any input must give an intent or a ParseError, never a panic
    let _ = nlq::query::parse(data);

    // Token offsets must index the input on char boundaries
    let lexicon = nlq::keywords::KeywordTables::builtin();
    for token in nlq::query::tokenize(data, lexicon) {
        assert_eq!(data.get(token.offset..token.end()), Some(token.text.as_str()));
    }
});
