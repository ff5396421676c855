//! Tests for the master index and the ordered merge

#[cfg(test)]
mod tests {
    use crate::bouquet_index::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn filenames(entries: &[crate::models::BouquetIndexEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.filename.as_str()).collect()
    }

    #[test]
    fn test_merge_example() {
        let merged = merge_index(&names(&["a.tv", "b.tv"]), &names(&["b.tv", "c.tv"]), |f| f.to_uppercase());
        assert_eq!(filenames(&merged), vec!["b.tv", "c.tv"]);
        assert_eq!(merged[0].display_name, "B.TV");
    }

    #[test]
    fn test_merge_indexed_first_then_rest_in_given_order() {
        let order = names(&["z.tv", "x.tv"]);
        let candidates = names(&["a.tv", "x.tv", "m.tv", "z.tv"]);
        let merged = merge_index(&order, &candidates, |f| f.to_string());
        assert_eq!(filenames(&merged), vec!["z.tv", "x.tv", "a.tv", "m.tv"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let order = names(&["b.tv", "a.tv"]);
        let candidates = names(&["a.tv", "c.tv", "b.tv"]);
        let first = merge_index(&order, &candidates, |f| f.to_string());
        let second = merge_index(&order, &candidates, |f| f.to_string());
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_index_order() {
        let content = "#NAME User - bouquets (TV)\n\
#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET \"userbouquet.favourites.tv\" ORDER BY bouquet\r\n\
#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET \"userbouquet.iptv_news.tv\" ORDER BY bouquet\n\
#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET \"\" ORDER BY bouquet\n\
#SERVICE 1:64:0:0:0:0:0:0:0:0::--- separator ---\n";
        assert_eq!(
            parse_index_order(content),
            vec!["userbouquet.favourites.tv", "userbouquet.iptv_news.tv"]
        );
    }

    #[test]
    fn test_register_appends_once() {
        let content = "#NAME User - bouquets (TV)\n";
        let updated = register(content, "userbouquet.iptv_a.tv").unwrap();
        assert_eq!(
            updated,
            "#NAME User - bouquets (TV)\n#SERVICE 1:7:1:0:0:0:0:0:0:0:FROM BOUQUET \"userbouquet.iptv_a.tv\" ORDER BY bouquet\n"
        );
        assert!(register(&updated, "userbouquet.iptv_a.tv").is_none());
    }

    #[test]
    fn test_register_detects_crlf_line_and_terminates_last_line() {
        let crlf = format!("{}\r\n", registration_line("userbouquet.iptv_a.tv"));
        assert!(register(&crlf, "userbouquet.iptv_a.tv").is_none());

        let unterminated = "#NAME User - bouquets (TV)";
        let updated = register(unterminated, "userbouquet.iptv_b.tv").unwrap();
        assert!(updated.starts_with("#NAME User - bouquets (TV)\n#SERVICE"));
        assert_eq!(parse_index_order(&updated), vec!["userbouquet.iptv_b.tv"]);
    }

    #[test]
    fn test_register_into_empty_index() {
        let updated = register("", "userbouquet.iptv_a.tv").unwrap();
        assert_eq!(updated, format!("{}\n", registration_line("userbouquet.iptv_a.tv")));
    }

    #[test]
    fn test_unregister_removes_every_mention() {
        let content = format!(
            "#NAME User\r\n{}\r\n{}\r\n{}\r\n",
            registration_line("userbouquet.iptv_a.tv"),
            registration_line("userbouquet.iptv_b.tv"),
            registration_line("userbouquet.iptv_a.tv"),
        );
        let updated = unregister(&content, "userbouquet.iptv_a.tv");
        assert_eq!(
            updated,
            format!("#NAME User\r\n{}\r\n", registration_line("userbouquet.iptv_b.tv"))
        );
    }

    #[test]
    fn test_filter_matches() {
        let filter = BouquetFilter::default();
        assert!(filter.matches("userbouquet.iptv_sport.tv"));
        assert!(filter.matches("userbouquet.ciefpsettings_movies.tv"));
        assert!(filter.matches("userbouquet.MyIPTV.tv"));
        assert!(!filter.matches("userbouquet.favourites.tv"));
        assert!(!filter.matches("userbouquet.iptv_sport.tv.del"));
        assert!(!filter.matches("userbouquet.iptv_sport.radio"));
        assert!(!filter.matches(INDEX_FILENAME));
    }

    proptest! {
        #[test]
        fn prop_merge_complete_and_ordered(
            order in prop::collection::vec("[a-f]\\.tv", 0..10),
            candidates in prop::collection::vec("[a-h]\\.tv", 0..10),
        ) {
            let merged = merge_index(&order, &candidates, |f| f.to_string());
            let merged_names: Vec<&str> = merged.iter().map(|e| e.filename.as_str()).collect();

            let merged_set: HashSet<&str> = merged_names.iter().copied().collect();
            let candidate_set: HashSet<&str> = candidates.iter().map(|s| s.as_str()).collect();
            prop_assert_eq!(merged_names.len(), merged_set.len());
            prop_assert_eq!(&merged_set, &candidate_set);

            // Indexed files come first, in index order
            let order_set: HashSet<&str> = order.iter().map(|s| s.as_str()).collect();
            let indexed_count = merged_names.iter().take_while(|n| order_set.contains(*n)).count();
            prop_assert!(merged_names[indexed_count..].iter().all(|n| !order_set.contains(*n)));
            let mut positions = merged_names[..indexed_count]
                .iter()
                .map(|n| order.iter().position(|o| o == n).unwrap());
            let mut last = None;
            for pos in positions.by_ref() {
                if let Some(prev) = last {
                    prop_assert!(pos > prev);
                }
                last = Some(pos);
            }
        }
    }
}
