pub const PAGE_SIZE: usize = 10;

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

pub fn slice<T>(items: &[T], page: usize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1) * PAGE_SIZE;
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}
