//! Integer to kanji numerals, as shown on the level plaque.

const DIGITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];

/// `0` renders as the empty string. A leading one is dropped before
/// 十, 百 and 千 but kept before 万 and 億 ("一万").
pub fn to_kanji(number: u32) -> String {
    let mut kanji = String::new();
    let mut rest = number;

    for (unit, label) in [(100_000_000, "億"), (10_000, "万")] {
        let group = rest / unit;
        if group > 0 {
            kanji.push_str(&below_myriad(group));
            kanji.push_str(label);
            rest %= unit;
        }
    }

    kanji.push_str(&below_myriad(rest));
    kanji
}

fn below_myriad(number: u32) -> String {
    let mut kanji = String::new();
    let mut rest = number;

    for (unit, label) in [(1000, "千"), (100, "百"), (10, "十")] {
        let digit = rest / unit;
        if digit > 0 {
            if digit != 1 {
                kanji.push_str(DIGITS[digit as usize]);
            }
            kanji.push_str(label);
            rest %= unit;
        }
    }

    kanji.push_str(DIGITS[rest as usize]);
    kanji
}

#[cfg(test)]
mod tests {
    use super::to_kanji;

    #[test]
    fn level_range_matches_plaque() {
        let expected = [
            "一", "二", "三", "四", "五", "六", "七", "八", "九", "十", "十一", "十二", "十三",
            "十四", "十五", "十六", "十七", "十八", "十九",
        ];
        for (n, kanji) in (1..=19).zip(expected) {
            assert_eq!(to_kanji(n), kanji, "{n}");
        }
    }

    #[test]
    fn tens_and_hundreds() {
        assert_eq!(to_kanji(0), "");
        assert_eq!(to_kanji(20), "二十");
        assert_eq!(to_kanji(99), "九十九");
        assert_eq!(to_kanji(100), "百");
        assert_eq!(to_kanji(101), "百一");
        assert_eq!(to_kanji(110), "百十");
        assert_eq!(to_kanji(250), "二百五十");
    }

    #[test]
    fn large_values_use_myriads() {
        assert_eq!(to_kanji(1000), "千");
        assert_eq!(to_kanji(2024), "二千二十四");
        assert_eq!(to_kanji(10_000), "一万");
        assert_eq!(to_kanji(100_000_001), "一億一");
        assert_eq!(to_kanji(u32::MAX), "四十二億九千四百九十六万七千二百九十五");
    }
}
