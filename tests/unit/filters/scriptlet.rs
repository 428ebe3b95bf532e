#[cfg(test)]
mod parse_tests {
    use super::super::*;

    fn args(rule: &str) -> Vec<String> {
        let parsed = parse_scriptlet_rule(rule).unwrap();
        std::iter::once(parsed.name).chain(parsed.args).collect()
    }

    #[test]
    fn parses_name_and_args() {
        let parsed =
            parse_scriptlet_rule(r#"example.org#%#//scriptlet("log-addEventListener", "click", "cb")"#)
                .unwrap();
        assert_eq!(
            parsed,
            ScriptletRule {
                domains: "example.org".to_string(),
                exception: false,
                name: "log-addEventListener".to_string(),
                args: vec!["click".to_string(), "cb".to_string()],
            }
        );
    }

    #[test]
    fn exception_and_empty_domains() {
        let parsed = parse_scriptlet_rule(r#"#@%#//scriptlet('log')"#).unwrap();
        assert_eq!(parsed.domains, "");
        assert!(parsed.exception);
        assert_eq!(parsed.name, "log");
        assert!(parsed.args.is_empty());

        let parsed = ScriptletRule::parse(r#"a.com,~b.com#@%#//scriptlet("log")"#).unwrap();
        assert_eq!(parsed.domains, "a.com,~b.com");
        assert!(parsed.exception);
    }

    #[test]
    fn marker_without_injection_prefix() {
        let parsed = parse_scriptlet_rule(r#"example.org#//scriptlet("log")"#).unwrap();
        assert_eq!(parsed.domains, "example.org");
        assert!(!parsed.exception);
        assert_eq!(parsed.name, "log");

        // every rule the classifier calls native goes through the tokenizer
        let rule = r#"example.org#//scriptlet("log", "a")"#;
        assert!(crate::lists::is_adg_scriptlet_rule(rule));
        assert_eq!(args(rule), ["log", "a"]);
    }

    #[test]
    fn quotes() {
        assert_eq!(args(r#"#%#//scriptlet('set-constant', 'a', "b")"#), ["set-constant", "a", "b"]);
        // the other quote character is plain text
        assert_eq!(args(r#"#%#//scriptlet("log", "it's", 'say "hi"')"#), ["log", "it's", r#"say "hi""#]);
        // separators inside an argument
        assert_eq!(args(r#"#%#//scriptlet("log", "a, b", "(c)")"#), ["log", "a, b", "(c)"]);
        assert_eq!(args(r#"#%#//scriptlet("log", "")"#), ["log", ""]);
    }

    #[test]
    fn escaped_delimiter() {
        assert_eq!(args(r#"#%#//scriptlet("log", "a\"b")"#), ["log", r#"a"b"#]);
        assert_eq!(args(r#"#%#//scriptlet('log', 'a\'b')"#), ["log", "a'b"]);
        // only the active delimiter is unescaped
        assert_eq!(args(r#"#%#//scriptlet('log', 'a\"b')"#), ["log", r#"a\"b"#]);
    }

    #[test]
    fn close_paren_must_be_last() {
        assert_eq!(args(r#"#%#//scriptlet("log") )"#), ["log"]);
        assert_eq!(
            parse_scriptlet_rule(r#"#%#//scriptlet("log") "#),
            Err(ScriptletRuleError::InvalidRule(r#"#%#//scriptlet("log") "#.to_string()))
        );
    }

    #[test]
    fn invalid_rules() {
        let unterminated = r#"example.org#%#//scriptlet("log", "a)"#;
        assert_eq!(
            parse_scriptlet_rule(unterminated),
            Err(ScriptletRuleError::InvalidRule(unterminated.to_string()))
        );

        let unquoted = "example.org#%#//scriptlet(log)";
        assert_eq!(
            parse_scriptlet_rule(unquoted),
            Err(ScriptletRuleError::NotScriptletRule(unquoted.to_string()))
        );

        let no_marker = "example.org##+js(log)";
        assert_eq!(
            parse_scriptlet_rule(no_marker),
            Err(ScriptletRuleError::NotScriptletRule(no_marker.to_string()))
        );

        let empty = "example.org#%#//scriptlet()";
        assert_eq!(
            parse_scriptlet_rule(empty),
            Err(ScriptletRuleError::MissingScriptletName(empty.to_string()))
        );

        assert!(parse_scriptlet_rule("example.org#%#//scriptlet").is_err());
        assert!(parse_scriptlet_rule(r#"example.org#%#//scriptlet("log""#).is_err());
    }
}

#[cfg(test)]
mod quoting_tests {
    use super::super::*;

    #[test]
    fn wraps_in_double_quotes() {
        assert_eq!(wrap_in_double_quotes("abc"), r#""abc""#);
        assert_eq!(wrap_in_double_quotes("'abc'"), r#""abc""#);
        assert_eq!(wrap_in_double_quotes(r#""abc""#), r#""abc""#);
        assert_eq!(wrap_in_double_quotes("'"), r#""'""#);
        assert_eq!(wrap_in_double_quotes(""), r#""""#);
    }

    #[test]
    fn escapes_the_other_quote() {
        assert_eq!(wrap_in_double_quotes(r#"'say "hi"'"#), r#""say \"hi\"""#);
        assert_eq!(wrap_in_double_quotes(r#""it's""#), r#""it\'s""#);
        // already escaped quotes are left alone
        assert_eq!(wrap_in_double_quotes(r#"'say \"hi\"'"#), r#""say \"hi\"""#);
        assert_eq!(wrap_in_double_quotes(r#"a"b"#), r#""a\"b""#);
    }
}

#[cfg(test)]
mod conversion_tests {
    use super::super::*;
    use crate::resources::{Resource, ResourceKind};

    fn storage() -> ResourceStorage {
        let scriptlet = |name: &str, aliases: &[&str]| Resource {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..Resource::simple(name, ResourceKind::Scriptlet, "function scriptlet() {}")
        };
        ResourceStorage::from_resources(vec![
            scriptlet(
                "abort-on-property-read",
                &["abort-on-property-read.js", "ubo-abort-on-property-read.js", "aopr.js", "ubo-aopr.js"],
            ),
            scriptlet("set-constant", &["set-constant.js", "ubo-set-constant.js"]),
            scriptlet("log", &["abp-log"]),
        ])
        .unwrap()
    }

    #[test]
    fn ubo_to_adg() {
        assert_eq!(
            convert_ubo_to_adg("example.com##+js(abort-on-property-read, Ya.videoAds)").unwrap(),
            [r#"example.com#%#//scriptlet("ubo-abort-on-property-read.js", "Ya.videoAds")"#]
        );
        assert_eq!(
            convert_ubo_to_adg("example.com#@#+js(aopr.js, ads)").unwrap(),
            [r#"example.com#@%#//scriptlet("ubo-aopr.js", "ads")"#]
        );
        assert_eq!(
            convert_ubo_to_adg("example.com##script:inject(set-constant.js, ads, true)").unwrap(),
            [r#"example.com#%#//scriptlet("ubo-set-constant.js", "ads", "true")"#]
        );
        assert_eq!(
            convert_ubo_to_adg("##+js(set, 'quoted', \"x\")").unwrap(),
            [r#"#%#//scriptlet("ubo-set.js", "quoted", "x")"#]
        );
        assert_eq!(
            convert_ubo_to_adg("example.com## +js(aopr)").unwrap(),
            [r#"example.com#%#//scriptlet("ubo-aopr.js")"#]
        );
    }

    #[test]
    fn ubo_to_adg_errors() {
        assert_eq!(
            convert_ubo_to_adg("example.com##.ad"),
            Err(ScriptletRuleError::NotUboScriptletRule("example.com##.ad".to_string()))
        );
        assert_eq!(
            convert_ubo_to_adg("example.com##+js()"),
            Err(ScriptletRuleError::MissingScriptletName("example.com##+js()".to_string()))
        );
    }

    #[test]
    fn trailing_backslash_does_not_convert() {
        let rule = r"example.com##+js(set-constant, a\)";
        assert_eq!(
            convert_ubo_to_adg(rule),
            Err(ScriptletRuleError::InvalidRule(rule.to_string()))
        );
        assert_eq!(convert_scriptlet_to_adg(rule), None);

        let rule = r"example.org#$#log 1; log a\";
        assert_eq!(
            convert_abp_to_adg(rule),
            Err(ScriptletRuleError::InvalidRule(rule.to_string()))
        );
    }

    #[test]
    fn abp_to_adg() {
        assert_eq!(
            convert_abp_to_adg("example.org#$#log 'hello world' 42").unwrap(),
            [r#"example.org#%#//scriptlet("abp-log", "hello world", "42")"#]
        );
        assert_eq!(
            convert_abp_to_adg(r#"example.org#@$#log "a; b"; abort-on-property-read ads"#).unwrap(),
            [
                r#"example.org#@%#//scriptlet("abp-log", "a; b")"#,
                r#"example.org#@%#//scriptlet("abp-abort-on-property-read", "ads")"#,
            ]
        );
        assert_eq!(
            convert_abp_to_adg("example.org#$#log 1;; log 2;").unwrap(),
            [
                r#"example.org#%#//scriptlet("abp-log", "1")"#,
                r#"example.org#%#//scriptlet("abp-log", "2")"#,
            ]
        );
        assert_eq!(
            convert_abp_to_adg("example.org#$# ; "),
            Err(ScriptletRuleError::MissingScriptletName("example.org#$# ; ".to_string()))
        );
        assert_eq!(
            convert_abp_to_adg("example.org##.ad"),
            Err(ScriptletRuleError::NotAbpSnippetRule("example.org##.ad".to_string()))
        );
    }

    #[test]
    fn comments_pass_through() {
        let comment = "! example.com##+js(aopr, ads)";
        assert_eq!(convert_ubo_to_adg(comment).unwrap(), [comment]);
        assert_eq!(convert_abp_to_adg(comment).unwrap(), [comment]);
        assert_eq!(convert_scriptlet_to_adg(comment).unwrap(), [comment]);
    }

    #[test]
    fn converts_any_dialect() {
        let adg = r#"example.org#%#//scriptlet("log")"#;
        assert_eq!(convert_scriptlet_to_adg(adg).unwrap(), [adg]);
        assert_eq!(
            convert_scriptlet_to_adg("example.org##+js(aopr, ads)").unwrap(),
            [r#"example.org#%#//scriptlet("ubo-aopr.js", "ads")"#]
        );
        assert_eq!(
            convert_scriptlet_to_adg("example.org#$#log").unwrap(),
            [r#"example.org#%#//scriptlet("abp-log")"#]
        );
        assert_eq!(convert_scriptlet_to_adg("||example.org^"), None);
        assert_eq!(convert_scriptlet_to_adg("example.org#$#.ad { display:none }"), None);
    }

    #[test]
    fn converted_rules_are_native() {
        for rule in [
            "example.com##+js(abort-on-property-read, Ya.videoAds)",
            "example.com#@#+js(set-constant, a.b, 'x y')",
            r#"example.com#$#log "a; b" 'c'; log d"#,
        ] {
            for converted in convert_scriptlet_to_adg(rule).unwrap() {
                assert_eq!(crate::lists::detect_rule_dialect(&converted), RuleDialect::Adg);
                assert!(parse_scriptlet_rule(&converted).is_ok(), "{}", converted);
            }
        }
    }

    #[test]
    fn adg_to_ubo() {
        let storage = storage();
        assert_eq!(
            convert_adg_to_ubo(r#"example.com#%#//scriptlet("abort-on-property-read", "Ya.videoAds")"#, &storage),
            Some("example.com##+js(abort-on-property-read, Ya.videoAds)".to_string())
        );
        assert_eq!(
            convert_adg_to_ubo(r#"example.com#@%#//scriptlet('ubo-aopr.js', 'a', 'b')"#, &storage),
            Some("example.com#@#+js(abort-on-property-read, a, b)".to_string())
        );
        assert_eq!(
            convert_adg_to_ubo(r#"#%#//scriptlet("set-constant")"#, &storage),
            Some("##+js(set-constant)".to_string())
        );
        // no uBlock Origin name
        assert_eq!(convert_adg_to_ubo(r#"example.com#%#//scriptlet("log")"#, &storage), None);
        // unknown scriptlet
        assert_eq!(convert_adg_to_ubo(r#"example.com#%#//scriptlet("nope")"#, &storage), None);
        // does not parse
        assert_eq!(convert_adg_to_ubo(r#"example.com#%#//scriptlet("log"#, &storage), None);
    }

    #[test]
    fn ubo_round_trip() {
        let storage = storage();
        let rule = "example.com##+js(abort-on-property-read, Ya.videoAds)";
        let adg = convert_ubo_to_adg(rule).unwrap();
        assert_eq!(convert_adg_to_ubo(&adg[0], &storage), Some(rule.to_string()));
    }
}
