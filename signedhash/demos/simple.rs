use signedhash::{BytePattern, Searcher, VecWindowReader};

#[derive(BytePattern)]
#[pattern(bytes = "lazy")]
pub struct LazyPattern;

fn main() {
    env_logger::init();

    // Array search, pattern built at compile time via the derive macro.
    let searcher = Searcher::new_from_matcher(LazyPattern::sequence(), 0).unwrap();
    let haystack = b"The quick brown fox jumps over the lazy dog";
    let pos = searcher.search_forward_array(haystack, 0, haystack.len());
    assert_eq!(pos, Some(35));

    // Backward search finds the same match scanning from the right.
    let pos = searcher.search_backward_array(haystack, 0, haystack.len() - 1);
    assert_eq!(pos, Some(35));

    // Stream search over a windowed reader, pattern straddling windows.
    let mut data = vec![0u8; 64];
    data[10..14].copy_from_slice(b"lazy");
    let mut reader = VecWindowReader::new(data.clone(), 7);
    let searcher = Searcher::new_from_bytes(b"lazy", 0).unwrap();
    let pos = searcher
        .search_forward_stream(&mut reader, 0, data.len() as u64 - 1)
        .unwrap();
    assert_eq!(pos, Some(10));

    // Pattern shorter than the q-gram length falls back to Shift-Or
    // automatically; callers never need to know which path ran.
    let short = Searcher::new_from_bytes(b"fox", 0).unwrap();
    let pos = short.search_forward_array(haystack, 0, haystack.len());
    assert_eq!(pos, Some(16));

    println!("all demo searches matched the expected positions");
}
