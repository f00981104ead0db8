use crate::{Match, Predictions, Side, TorikumiData};
use std::borrow::Cow;

/// Decorative header used by the legacy one-shot generator.
pub const LEGACY_HEADER_KAOMOJI: &str = "（・ω・）ノ";

const WIN_MARK: char = '○';
const LOSE_MARK: char = '●';
const VS_MARK: char = '－';
const FULL_WIDTH_SPACE: char = '\u{3000}';

const DAY_LABELS: [&str; 15] = [
    "初日",
    "二日目",
    "三日目",
    "四日目",
    "五日目",
    "六日目",
    "七日目",
    "中日",
    "九日目",
    "十日目",
    "十一日目",
    "十二日目",
    "十三日目",
    "十四日目",
    "千秋楽",
];

const SENSHURAKU: &str = "千秋楽";

/// Traditional label for a tournament day.
///
/// Total over all integers: days outside 1..=15 fall back to `"{day}日目"`.
pub fn day_to_kanji(day: i64) -> Cow<'static, str> {
    match usize::try_from(day).ok().filter(|d| (1..=DAY_LABELS.len()).contains(d)) {
        Some(d) => Cow::Borrowed(DAY_LABELS[d - 1]),
        None => Cow::Owned(format!("{day}日目")),
    }
}

/// `"2026年1月場所"` + day label. The final day is always 千秋楽.
pub fn format_basho_day(basho_label: &str, day: i64) -> String {
    if day == 15 {
        return format!("{basho_label}{SENSHURAKU}");
    }
    format!("{basho_label}{}", day_to_kanji(day))
}

/// `"202601"` → `"2026年1月場所"`. Anything that is not six ASCII digits is returned as-is.
pub fn basho_id_to_label(basho_id: &str) -> String {
    if basho_id.len() != 6 || !basho_id.bytes().all(|b| b.is_ascii_digit()) {
        return basho_id.to_string();
    }
    let (year, month) = basho_id.split_at(4);
    let month = month.trim_start_matches('0');
    format!("{year}年{month}月場所")
}

/// One line per bout, circle on the predicted winner's end.
pub fn match_line(m: &Match, winner: Side) -> String {
    let (east_mark, west_mark) = match winner {
        Side::East => (WIN_MARK, LOSE_MARK),
        Side::West => (LOSE_MARK, WIN_MARK),
    };
    format!("{east_mark}{}{VS_MARK}{}{west_mark}", m.east, m.west)
}

/// Render every bout in order. Unset predictions render as an east win.
pub fn generate_match_lines(matches: &[Match], predictions: &Predictions) -> String {
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| match_line(m, predictions.winner_or_default(i)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The parts of a shareable prediction post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionText {
    pub source_url: String,
    pub basho_day: String,
    pub header_comment: String,
    pub match_lines: String,
    pub footer_comment: String,
}

impl PredictionText {
    pub fn for_day(
        data: &TorikumiData,
        predictions: &Predictions,
        header_comment: &str,
        footer_comment: &str,
    ) -> Self {
        Self {
            source_url: data.source.clone(),
            basho_day: format_basho_day(&data.basho.label, i64::from(data.day)),
            header_comment: header_comment.to_string(),
            match_lines: generate_match_lines(&data.matches, predictions),
            footer_comment: footer_comment.to_string(),
        }
    }

    /// Join the parts with newlines. Empty source/header/footer lines are
    /// dropped entirely; the day and match lines are always present.
    pub fn assemble(&self) -> String {
        let optional = |s: &str| (!s.is_empty()).then(|| s.to_string());
        [
            optional(&self.source_url),
            Some(self.basho_day.clone()),
            optional(&self.header_comment),
            Some(self.match_lines.clone()),
            optional(&self.footer_comment),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Legacy one-shot text: kaomoji header, unset bouts left unmarked.
///
/// Kept for compatibility with posts written by the first release. Its unset
/// handling differs from [`generate_match_lines`] and the two are never mixed.
pub fn generate_legacy_text(day: i64, matches: &[Match], predictions: &Predictions) -> String {
    let header = format!("{}{LEGACY_HEADER_KAOMOJI}", day_to_kanji(day));
    let lines = matches.iter().enumerate().map(|(i, m)| match predictions.get(i) {
        Some(side) => match_line(m, side),
        None => format!("{FULL_WIDTH_SPACE}{}{VS_MARK}{}{FULL_WIDTH_SPACE}", m.east, m.west),
    });
    std::iter::once(header).chain(lines).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Basho;

    fn bout(east: &str, west: &str) -> Match {
        Match { east: east.into(), west: west.into() }
    }

    fn preds(entries: &[(usize, Option<Side>)]) -> Predictions {
        entries.iter().copied().collect()
    }

    #[test]
    fn day_labels_match_the_table() {
        assert_eq!(day_to_kanji(1), "初日");
        assert_eq!(day_to_kanji(8), "中日");
        assert_eq!(day_to_kanji(12), "十二日目");
        assert_eq!(day_to_kanji(15), "千秋楽");
        for day in 1..=15 {
            assert_eq!(day_to_kanji(day), DAY_LABELS[(day - 1) as usize]);
        }
    }

    #[test]
    fn out_of_range_days_fall_back() {
        assert_eq!(day_to_kanji(0), "0日目");
        assert_eq!(day_to_kanji(16), "16日目");
        assert_eq!(day_to_kanji(-1), "-1日目");
        assert_eq!(day_to_kanji(16), day_to_kanji(16));
    }

    #[test]
    fn basho_day_concatenates() {
        assert_eq!(format_basho_day("2026年1月場所", 12), "2026年1月場所十二日目");
        assert_eq!(format_basho_day("2026年1月場所", 15), "2026年1月場所千秋楽");
        assert_eq!(format_basho_day("2026年3月場所", 1), "2026年3月場所初日");
        assert_eq!(format_basho_day("2026年3月場所", 20), "2026年3月場所20日目");
    }

    #[test]
    fn basho_labels_from_ids() {
        assert_eq!(basho_id_to_label("202601"), "2026年1月場所");
        assert_eq!(basho_id_to_label("202511"), "2025年11月場所");
        assert_eq!(basho_id_to_label("special"), "special");
    }

    #[test]
    fn match_lines_mark_winner_and_loser() {
        let matches = [bout("高安", "大の里")];
        assert_eq!(generate_match_lines(&matches, &preds(&[(0, Some(Side::East))])), "○高安－大の里●");
        assert_eq!(generate_match_lines(&matches, &preds(&[(0, Some(Side::West))])), "●高安－大の里○");
        assert_eq!(generate_match_lines(&matches, &Predictions::new()), "○高安－大の里●");
        assert_eq!(generate_match_lines(&matches, &preds(&[(0, None)])), "○高安－大の里●");
    }

    #[test]
    fn match_lines_keep_order() {
        let matches = [bout("高安", "大の里"), bout("照ノ富士", "豊昇龍")];
        let text = generate_match_lines(&matches, &preds(&[(0, Some(Side::East)), (1, Some(Side::West))]));
        assert_eq!(text, "○高安－大の里●\n●照ノ富士－豊昇龍○");
        assert_eq!(generate_match_lines(&[], &Predictions::new()), "");
    }

    fn full_parts() -> PredictionText {
        PredictionText {
            source_url: "https://sports.yahoo.co.jp/sumo/torikumi/202601/12".into(),
            basho_day: "2026年1月場所十二日目".into(),
            header_comment: "（・ω・）ノ".into(),
            match_lines: "○高安－大の里●".into(),
            footer_comment: "これで".into(),
        }
    }

    #[test]
    fn assemble_joins_all_parts() {
        assert_eq!(
            full_parts().assemble(),
            "https://sports.yahoo.co.jp/sumo/torikumi/202601/12\n2026年1月場所十二日目\n（・ω・）ノ\n○高安－大の里●\nこれで"
        );
    }

    #[test]
    fn assemble_drops_each_empty_optional_line() {
        let full_lines = full_parts().assemble().lines().count();

        let mut no_url = full_parts();
        no_url.source_url.clear();
        assert_eq!(no_url.assemble(), "2026年1月場所十二日目\n（・ω・）ノ\n○高安－大の里●\nこれで");
        assert_eq!(no_url.assemble().lines().count(), full_lines - 1);

        let mut no_header = full_parts();
        no_header.header_comment.clear();
        assert_eq!(no_header.assemble().lines().count(), full_lines - 1);

        let mut no_footer = full_parts();
        no_footer.footer_comment.clear();
        assert!(no_footer.assemble().ends_with("○高安－大の里●"));
        assert_eq!(no_footer.assemble().lines().count(), full_lines - 1);
    }

    #[test]
    fn assemble_keeps_blank_match_block() {
        let parts = PredictionText {
            basho_day: "2026年1月場所初日".into(),
            footer_comment: "これで".into(),
            ..Default::default()
        };
        assert_eq!(parts.assemble(), "2026年1月場所初日\n\nこれで");
    }

    #[test]
    fn for_day_builds_parts_from_payload() {
        let data = TorikumiData {
            source: "https://example.com/202601/15".into(),
            basho: Basho { id: "202601".into(), label: "2026年1月場所".into() },
            day: 15,
            matches: vec![bout("高安", "大の里")],
            ..Default::default()
        };
        let text = PredictionText::for_day(&data, &preds(&[(0, Some(Side::West))]), "", "");
        assert_eq!(text.assemble(), "https://example.com/202601/15\n2026年1月場所千秋楽\n●高安－大の里○");
    }

    #[test]
    fn legacy_text_leaves_unset_bouts_blank() {
        let matches = [bout("高安", "大の里"), bout("照ノ富士", "豊昇龍")];
        let text = generate_legacy_text(8, &matches, &preds(&[(1, Some(Side::West))]));
        assert_eq!(text, "中日（・ω・）ノ\n\u{3000}高安－大の里\u{3000}\n●照ノ富士－豊昇龍○");
    }
}
