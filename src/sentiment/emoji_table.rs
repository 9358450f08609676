//! 絵文字のコードポイント表
//!
//! 感情セットを引く前に「この文字は絵文字か」を判定する。キーキャップの基底文字 (`0-9`, `#`, `*`)、
//! 異体字セレクタ、ゼロ幅接合子は単体では絵文字として扱わない。

/// 異体字セレクタ16 (絵文字表示)
pub const VARIATION_SELECTOR_16: char = '\u{FE0F}';
/// 複数人・複合絵文字のシーケンスで使うゼロ幅接合子
pub const ZERO_WIDTH_JOINER: char = '\u{200D}';

/// `c` が絵文字のコードポイントなら true
pub fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x00A9 | 0x00AE |                       // © ®
        0x203C | 0x2049 |                       // ‼ ⁉
        0x2122 | 0x2139 |
        0x2194..=0x2199 | 0x21A9..=0x21AA |     // 矢印
        0x231A..=0x231B | 0x2328 | 0x23CF |
        0x23E9..=0x23F3 | 0x23F8..=0x23FA |     // 再生操作、時計
        0x24C2 |
        0x25AA..=0x25AB | 0x25B6 | 0x25C0 | 0x25FB..=0x25FE |
        // その他の記号: Emoji=Yes のみ (★ ☆ ♪ ✓ ☐ などは含めない)
        0x2600..=0x2604 | 0x260E | 0x2611 | 0x2614..=0x2615 | 0x2618 | 0x261D | 0x2620 |
        0x2622..=0x2623 | 0x2626 | 0x262A | 0x262E..=0x262F | 0x2638..=0x263A | 0x2640 |
        0x2642 | 0x2648..=0x2653 | 0x265F..=0x2660 | 0x2663 | 0x2665..=0x2666 | 0x2668 |
        0x267B | 0x267E..=0x267F | 0x2692..=0x2697 | 0x2699 | 0x269B..=0x269C |
        0x26A0..=0x26A1 | 0x26A7 | 0x26AA..=0x26AB | 0x26B0..=0x26B1 | 0x26BD..=0x26BE |
        0x26C4..=0x26C5 | 0x26C8 | 0x26CE..=0x26CF | 0x26D1 | 0x26D3..=0x26D4 |
        0x26E9..=0x26EA | 0x26F0..=0x26F5 | 0x26F7..=0x26FA | 0x26FD |
        // 装飾記号
        0x2702 | 0x2705 | 0x2708..=0x270D | 0x270F | 0x2712 | 0x2714 | 0x2716 | 0x271D |
        0x2721 | 0x2728 | 0x2733..=0x2734 | 0x2744 | 0x2747 | 0x274C | 0x274E |
        0x2753..=0x2755 | 0x2757 | 0x2763..=0x2764 | 0x2795..=0x2797 | 0x27A1 | 0x27B0 |
        0x27BF |
        0x2934..=0x2935 |
        0x2B05..=0x2B07 | 0x2B1B..=0x2B1C | 0x2B50 | 0x2B55 |
        0x3030 | 0x303D | 0x3297 | 0x3299 |
        0x1F004 | 0x1F0CF |
        0x1F170..=0x1F251 |                     // 囲み英数字・囲み漢字、国旗
        0x1F300..=0x1F5FF |                     // 記号と絵文字
        0x1F600..=0x1F64F |                     // 顔
        0x1F680..=0x1F6FF |                     // 乗り物と地図
        0x1F7E0..=0x1F7EB | 0x1F7F0 |           // 色付き図形
        0x1F900..=0x1F9FF |                     // 補助記号と絵文字
        0x1FA70..=0x1FAFF                       // 拡張A
    )
}

/// `text` 中の絵文字を順に集める
pub fn extract_emojis(text: &str) -> Vec<char> {
    text.chars().filter(|c| is_emoji(*c)).collect()
}

/// 異体字セレクタと接合子を除く (`❤️` と `❤` を同一視するため)
pub fn base_form(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| *c != VARIATION_SELECTOR_16 && *c != ZERO_WIDTH_JOINER)
        .collect()
}
