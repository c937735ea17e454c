//! 分页参数

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
/// 保证 `offset` 不会溢出
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// 越界的页码回落到 1，过大的页码截断到 `MAX_PAGE`，越界的页大小回落到默认值
    pub fn new(page: i64, size: i64) -> Self {
        let page = if page < 1 { 1 } else { page.min(MAX_PAGE) };
        let size = if !(1..=MAX_PAGE_SIZE).contains(&size) {
            DEFAULT_PAGE_SIZE
        } else {
            size
        };
        Self { page, size }
    }

    /// 查询参数中的非数字值按缺省处理
    pub fn parse(page: Option<&str>, size: Option<&str>) -> Self {
        let page = page.and_then(|p| p.trim().parse().ok()).unwrap_or(1);
        let size = size
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self::new(page, size)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// 对内存中已排序的数据取一页
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(self.limit() as usize)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Pagination::new(0, 0), Pagination { page: 1, size: 10 });
        assert_eq!(Pagination::new(-3, 101), Pagination { page: 1, size: 10 });
        assert_eq!(Pagination::new(4, 100), Pagination { page: 4, size: 100 });
    }

    #[test]
    fn parses_query_strings_leniently() {
        assert_eq!(
            Pagination::parse(Some("abc"), Some("x")),
            Pagination::default()
        );
        assert_eq!(
            Pagination::parse(Some("2"), Some("25")),
            Pagination { page: 2, size: 25 }
        );
    }

    #[test]
    fn slices_the_requested_page() {
        let items: Vec<i32> = (1..=25).collect();
        let page = Pagination::new(3, 10);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.slice(&items), vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let page = Pagination::parse(Some("9223372036854775807"), Some("10"));
        assert_eq!(page.page, MAX_PAGE);
        assert!(page.offset() > 0);
        let items: Vec<i32> = (1..=25).collect();
        assert!(page.slice(&items).is_empty());

        let widest = Pagination::new(i64::MAX, MAX_PAGE_SIZE);
        assert_eq!(widest.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);
    }
}
