//! 베트남어 이름 정렬
//!
//! 베트남어 자모 순서(a ă â b c d đ e ê ... o ô ơ ... u ư ...)를 따르고,
//! 성조와 대소문자는 1차 비교에서 무시합니다.

/// 자모 순서 (라틴 보조 문자 f, j, w, z 포함)
const ALPHABET: &[char] = &[
    'a', 'ă', 'â', 'b', 'c', 'd', 'đ', 'e', 'ê', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'ô', 'ơ', 'p', 'q', 'r', 's', 't', 'u', 'ư', 'v', 'w', 'x', 'y', 'z',
];

/// 자모 가중치 시작값 (구두점, 숫자, 공백보다 뒤)
const LETTER_BASE: u32 = 0x11_0000;

/// 성조 (없음, huyền, hỏi, ngã, sắc, nặng)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tone {
    Level,
    Grave,
    Hook,
    Tilde,
    Acute,
    Dot,
}

/// 소문자 한 글자를 (성조를 뺀 글자, 성조)로 분리
fn split_tone(c: char) -> (char, Tone) {
    use Tone::*;

    const TONED: &[(char, [char; 5])] = &[
        ('a', ['à', 'ả', 'ã', 'á', 'ạ']),
        ('ă', ['ằ', 'ẳ', 'ẵ', 'ắ', 'ặ']),
        ('â', ['ầ', 'ẩ', 'ẫ', 'ấ', 'ậ']),
        ('e', ['è', 'ẻ', 'ẽ', 'é', 'ẹ']),
        ('ê', ['ề', 'ể', 'ễ', 'ế', 'ệ']),
        ('i', ['ì', 'ỉ', 'ĩ', 'í', 'ị']),
        ('o', ['ò', 'ỏ', 'õ', 'ó', 'ọ']),
        ('ô', ['ồ', 'ổ', 'ỗ', 'ố', 'ộ']),
        ('ơ', ['ờ', 'ở', 'ỡ', 'ớ', 'ợ']),
        ('u', ['ù', 'ủ', 'ũ', 'ú', 'ụ']),
        ('ư', ['ừ', 'ử', 'ữ', 'ứ', 'ự']),
        ('y', ['ỳ', 'ỷ', 'ỹ', 'ý', 'ỵ']),
    ];
    const TONES: [Tone; 5] = [Grave, Hook, Tilde, Acute, Dot];

    for (base, forms) in TONED {
        if let Some(i) = forms.iter().position(|f| *f == c) {
            return (*base, TONES[i]);
        }
    }
    (c, Level)
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn weight(base: char) -> u32 {
    match ALPHABET.iter().position(|letter| *letter == base) {
        Some(i) => LETTER_BASE + i as u32,
        None => base as u32,
    }
}

/// 정렬 키
///
/// 자모 가중치를 먼저 비교하고, 같으면 성조, 마지막으로 원문을 비교합니다.
pub fn sort_key(text: &str) -> (Vec<u32>, Vec<Tone>, String) {
    let (weights, tones): (Vec<u32>, Vec<Tone>) = text
        .chars()
        .map(|c| {
            let (base, tone) = split_tone(lower(c));
            (weight(base), tone)
        })
        .unzip();
    (weights, tones, text.to_string())
}
