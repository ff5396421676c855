//! Tests for bouquet file parsing and serialization

#[cfg(test)]
mod tests {
    use crate::bouquet_parser::*;
    use crate::models::{Bouquet, ChannelRecord};
    use proptest::prelude::*;

    #[test]
    fn test_parse_crlf_content() {
        let content = "#NAME Sport HD\r\n#SERVICE 4097:0:1:0:0:0:0:0:0:0:http%3a//example.com/1.ts:Sport 1\r\n#DESCRIPTION Sport 1\r\n";
        let bouquet = parse_bouquet(content, "fallback");
        assert_eq!(bouquet.name, "Sport HD");
        assert_eq!(bouquet.records.len(), 1);
        assert_eq!(
            bouquet.records[0].service,
            "4097:0:1:0:0:0:0:0:0:0:http%3a//example.com/1.ts:Sport 1"
        );
        assert_eq!(bouquet.records[0].description, "Sport 1");
    }

    #[test]
    fn test_parse_without_name_uses_fallback() {
        let content = "#SERVICE 1:0:1:A\n#DESCRIPTION A\n";
        let bouquet = parse_bouquet(content, &fallback_name("userbouquet.iptv_movies.tv"));
        assert_eq!(bouquet.name, "iptv_movies");
        assert_eq!(bouquet.records, vec![ChannelRecord::new("1:0:1:A", "A")]);
    }

    #[test]
    fn test_parse_empty_content() {
        let bouquet = parse_bouquet("", "empty");
        assert_eq!(bouquet.name, "empty");
        assert!(bouquet.records.is_empty());
    }

    #[test]
    fn test_parse_service_without_description() {
        let content = "#NAME Mixed\n#SERVICE 1:0:1:A\n#SERVICE 1:0:1:B\n#DESCRIPTION Bee\n#SERVICE 1:0:1:C\n";
        let bouquet = parse_bouquet(content, "x");
        assert_eq!(
            bouquet.records,
            vec![
                ChannelRecord::new("1:0:1:A", ""),
                ChannelRecord::new("1:0:1:B", "Bee"),
                ChannelRecord::new("1:0:1:C", ""),
            ]
        );
        assert_eq!(bouquet.records[0].display_text(), "1:0:1:A");
        assert_eq!(bouquet.records[1].display_text(), "Bee");
    }

    #[test]
    fn test_parse_ignores_orphan_description_and_unknown_lines() {
        let content = "#NAME Odd\n#DESCRIPTION orphan\n#SORT 0\nrandom text\n#SERVICE 1:0:1:A\n#DESCRIPTION A\n";
        let bouquet = parse_bouquet(content, "x");
        assert_eq!(bouquet.records, vec![ChannelRecord::new("1:0:1:A", "A")]);
    }

    #[test]
    fn test_parse_last_name_wins() {
        let content = "#NAME Old Title\n#SERVICE 1:0:1:A\n#DESCRIPTION A\n#NAME New Title\n";
        let bouquet = parse_bouquet(content, "fb");
        assert_eq!(bouquet.name, "New Title");
        assert_eq!(bouquet.records, vec![ChannelRecord::new("1:0:1:A", "A")]);
        // the saved file carries the newer title
        assert!(serialize_bouquet(&bouquet).starts_with("#NAME New Title\n"));
        // listings still read the first title without parsing records
        assert_eq!(scan_name(content), Some("Old Title".to_string()));
    }

    #[test]
    fn test_parse_empty_service_line_opens_no_record() {
        let content = "#NAME N\n#SERVICE 1:0:1:A\n#SERVICE\n#DESCRIPTION dropped\n#SERVICE 1:0:1:B\n";
        let bouquet = parse_bouquet(content, "x");
        assert_eq!(
            bouquet.records,
            vec![ChannelRecord::new("1:0:1:A", ""), ChannelRecord::new("1:0:1:B", "")]
        );
    }

    #[test]
    fn test_serialize_layout() {
        let bouquet = Bouquet {
            name: "MyList".to_string(),
            records: vec![
                ChannelRecord::new("1:0:1:...:0", "CNN"),
                ChannelRecord::new("1:0:1:...:1", ""),
            ],
        };
        assert_eq!(
            serialize_bouquet(&bouquet),
            "#NAME MyList\n#SERVICE 1:0:1:...:0\n#DESCRIPTION CNN\n#SERVICE 1:0:1:...:1\n"
        );
    }

    #[test]
    fn test_round_trip_example() {
        let content = "#NAME MyList\n#SERVICE 1:0:1:...:0\n#DESCRIPTION CNN\n#SERVICE 1:0:1:...:1\n#DESCRIPTION BBC\n";
        let bouquet = parse_bouquet(content, "x");
        assert_eq!(serialize_bouquet(&bouquet), content);
        assert_eq!(parse_bouquet(&serialize_bouquet(&bouquet), "other"), bouquet);
    }

    #[test]
    fn test_scan_name_and_display_name() {
        assert_eq!(scan_name("#SERVICE 1\n#NAME  Late Title \n"), Some("Late Title".to_string()));
        assert_eq!(scan_name("#SERVICE 1\n"), None);
        assert_eq!(display_name("userbouquet.iptv_kids.tv", "#SERVICE 1\n"), "iptv_kids");
        assert_eq!(display_name("userbouquet.iptv_kids.tv", "#NAME Kids\n"), "Kids");
    }

    #[test]
    fn test_parse_example_bouquet() {
        let content = "#NAME MyList\n#SERVICE 1:0:1:...:0\n#DESCRIPTION CNN\n#SERVICE 1:0:1:...:1\n#DESCRIPTION BBC\n";
        let bouquet = parse_bouquet(content, "fallback");
        assert_eq!(bouquet.name, "MyList");
        assert_eq!(
            bouquet.records,
            vec![
                ChannelRecord::new("1:0:1:...:0", "CNN"),
                ChannelRecord::new("1:0:1:...:1", "BBC"),
            ]
        );
    }

    #[test]
    fn test_fallback_name() {
        assert_eq!(fallback_name("userbouquet.iptv_news.tv"), "iptv_news");
        assert_eq!(fallback_name("favourites.tv"), "favourites");
        assert_eq!(fallback_name("userbouquet.ciefp"), "ciefp");
    }

    #[test]
    fn test_has_name_header() {
        assert!(has_name_header("#NAME Sports\n"));
        assert!(has_name_header("\u{feff}#NAME Sports\r\n"));
        assert!(!has_name_header("\n#NAME Sports\n"));
        assert!(!has_name_header("<html>rate limited</html>"));
    }

    fn bouquet_line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[ A-Za-z0-9:]{0,12}".prop_map(|s| format!("#NAME{}", s)),
            "[ A-Za-z0-9:%/.]{0,24}".prop_map(|s| format!("#SERVICE{}", s)),
            "[ A-Za-z0-9:+/]{0,16}".prop_map(|s| format!("#DESCRIPTION{}", s)),
            "[ A-Za-z0-9#]{0,16}",
        ]
    }

    proptest! {
        #[test]
        fn prop_round_trip(lines in prop::collection::vec(bouquet_line(), 0..24), crlf in any::<bool>()) {
            let sep = if crlf { "\r\n" } else { "\n" };
            let content = lines.join(sep);
            let bouquet = parse_bouquet(&content, "fallback");
            let reparsed = parse_bouquet(&serialize_bouquet(&bouquet), "unused");
            prop_assert_eq!(reparsed, bouquet);
        }
    }
}
