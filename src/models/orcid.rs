//! ORCID 输入格式化
//!
//! ORCID 形如 `0000-0001-2345-6789`：16 位数字，每 4 位一组

/// ORCID 数字位数
pub const ORCID_DIGITS: usize = 16;

/// 格式化用户输入：去掉非数字字符，截断到 16 位，每 4 位用 `-` 连接
///
/// 输入过程中调用，因此不足 16 位时也会返回部分分组（如 `0000-00`）
pub fn format_orcid(raw: &str) -> String {
    let digits: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(ORCID_DIGITS)
        .collect();

    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// 是否已填满 16 位
pub fn is_complete(orcid: &str) -> bool {
    orcid.chars().filter(|c| c.is_ascii_digit()).count() == ORCID_DIGITS
}

/// ORCID 个人主页地址（仅当 16 位完整时）
pub fn profile_url(orcid: &str) -> Option<String> {
    if !is_complete(orcid) {
        return None;
    }
    let digits: String = orcid.chars().filter(|c| c.is_ascii_digit()).collect();
    Some(format!("https://orcid.org/{}", digits))
}
