//! 可通过链接访问的内容实体

/// 拥有站内路径的内容（课程、作业、影片教材）
pub trait ContentEntity {
    /// 站内绝对路径，如 `/assignment/5`
    fn absolute_url(&self) -> String;
}

/// 拼接站点根地址与实体路径
pub fn full_url(site: &str, entity: &dyn ContentEntity) -> String {
    format!("{}{}", site.trim_end_matches('/'), entity.absolute_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Page(i64);

    impl ContentEntity for Page {
        fn absolute_url(&self) -> String {
            format!("/page/{}", self.0)
        }
    }

    #[test]
    fn test_full_url_joins_without_double_slash() {
        assert_eq!(full_url("https://example.com/", &Page(3)), "https://example.com/page/3");
        assert_eq!(full_url("https://example.com", &Page(3)), "https://example.com/page/3");
    }
}
