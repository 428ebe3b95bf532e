#![no_main]

use adblock_scriptlets::filters::scriptlet::{convert_scriptlet_to_adg, parse_scriptlet_rule};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(rule) = std::str::from_utf8(data) {
        let _ = parse_scriptlet_rule(rule);
        if let Some(converted) = convert_scriptlet_to_adg(rule) {
            for adg_rule in converted {
                let _ = parse_scriptlet_rule(&adg_rule);
            }
        }
    }
});
