//! Schema parser fuzz target: arbitrary text must parse or fail, never panic.
//! Every struct entry has a token iff it is resolved, and the token matches its
//! precomputed length; sizes never report a template as resolved.
//! Build with: cargo fuzz run parser_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

/// Tokens longer than this are checked by length only, to stay under the
/// fuzzer's allocation limit.
#[cfg(fuzzing)]
const MAX_MATERIALIZED: usize = 1 << 20;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    if let Ok(schema) = packlayout::parse(s) {
        for (_, ty) in schema.entries() {
            if let Some(def) = ty.as_struct() {
                assert_eq!(def.token_len().is_some(), def.is_resolved());
                if def.token_len().map_or(true, |len| len <= MAX_MATERIALIZED) {
                    assert_eq!(def.token_string().map(str::len), def.token_len());
                    let _ = packlayout::dump::summary_line("entry", def);
                }
                if let Ok(Some(_)) = def.byte_size() {
                    assert!(def.is_resolved());
                }
            }
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run parser_fuzz");
}
