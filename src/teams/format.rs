//! Name formatting: plain name → fname.
//!
//! fold to ASCII → lowercase → trim non-word ends → per-source corrections.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Loteca spells a handful of clubs in several ways over the years.
/// Keys are already folded and lowercased.
pub const LOTECA_CORRECTIONS: &[(&str, &str)] = &[
    ("sao jose (pa", "sao jose"),                  // SÃO JOSÉ (PA)/RS
    ("a b c", "abc"),                              // A B C/RN
    ("atalanta bergamas", "atalanta"),             // ATALANTA BERGAMAS/ITA
    ("boa esporte", "boa esporte clube"),          // BOA ESPORTE/MG
    ("cfz brasilia", "cfz"),                       // CFZ BRASÍLIA/DF JUNIOR
    ("deporti la coruna", "deportivo la coruna"),  // DEPORTI LA CORUNA/ESP
    ("e c democrata", "democrata"),                // E C DEMOCRATA/MG
    ("fluminense feira santana", "fluminense"),    // FLUMINENSE FEIRA SANTANA/BA
    ("ji-parana", "ji parana"),                    // JI PARANÁ/RO JÚNIOR
    ("p.  desportos", "portuguesa"),               // P. DESPORTOS/SP
    ("s. bernardo", "sao bernardo"),               // S. BERNARDO/SP
    ("s. paulo", "sao paulo"),                     // S. PAULO/SP
    ("s.bento", "sao bento"),                      // S.BENTO/SP
    ("uniao s.joao", "uniao sao joao"),            // UNIÃO S.JOÃO/SP
    ("vasco", "vasco da gama"),                    // VASCO/RJ
    ("xv nov. piracicaba", "xv piracicaba"),       // XV NOV. PIRACICABA/SP
];

/// BetExplorer names are consistent enough to go uncorrected.
pub const BETEXPLORER_CORRECTIONS: &[(&str, &str)] = &[];

/// Same notion of "word character" as a regex `\w`.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Strip leading and trailing non-word characters.
pub fn re_strip(s: &str) -> &str {
    s.trim_matches(|c: char| !is_word_char(c))
}

/// Fold accented characters to their closest ASCII form ("Ç" → "C").
pub fn fold_ascii(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(fold_special)
        .collect()
}

// Letters that NFKD leaves untouched.
fn fold_special(c: char) -> Vec<char> {
    let folded: &str = match c {
        'ø' => "o",
        'Ø' => "O",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ß' => "ss",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'ł' => "l",
        'Ł' => "L",
        'ı' => "i",
        'þ' => "th",
        'Þ' => "TH",
        '\u{2019}' | '\u{2018}' => "'",
        _ => return vec![c],
    };
    folded.chars().collect()
}

/// Produce the join key used to compare names across sources.
pub fn format_name(plain_name: &str, corrections: &[(&str, &str)]) -> String {
    let folded = fold_ascii(plain_name).to_lowercase();
    let name = re_strip(&folded);
    corrections
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents() {
        assert_eq!(fold_ascii("POÇOS DE CALDAS"), "POCOS DE CALDAS");
        assert_eq!(fold_ascii("São José"), "Sao Jose");
        assert_eq!(fold_ascii("Bodø/Glimt"), "Bodo/Glimt");
    }

    #[test]
    fn strips_non_word_ends() {
        assert_eq!(re_strip("  (Flamengo) - "), "Flamengo");
        assert_eq!(re_strip("S.BENTO"), "S.BENTO");
        assert_eq!(re_strip("..."), "");
    }

    #[test]
    fn formats_plain_name() {
        assert_eq!(format_name("POÇOS DE CALDAS ", LOTECA_CORRECTIONS), "pocos de caldas");
    }

    #[test]
    fn applies_corrections() {
        assert_eq!(format_name("BOA ESPORTE", LOTECA_CORRECTIONS), "boa esporte clube");
        assert_eq!(format_name("VASCO", LOTECA_CORRECTIONS), "vasco da gama");
        assert_eq!(format_name("S. PAULO", LOTECA_CORRECTIONS), "sao paulo");
        assert_eq!(format_name("UNIÃO S.JOÃO", LOTECA_CORRECTIONS), "uniao sao joao");
        assert_eq!(format_name("SÃO JOSÉ (PA)", LOTECA_CORRECTIONS), "sao jose");
    }

    #[test]
    fn corrections_are_source_specific() {
        assert_eq!(format_name("Vasco", BETEXPLORER_CORRECTIONS), "vasco");
    }

    #[test]
    fn formatting_is_idempotent() {
        for plain in ["Flamengo", "SÃO JOSÉ (PA)", "BOA ESPORTE", "Atl. Madrid", "A B C"] {
            let once = format_name(plain, LOTECA_CORRECTIONS);
            let twice = format_name(&once, LOTECA_CORRECTIONS);
            assert_eq!(once, twice, "not idempotent for {plain:?}");
        }
    }
}
