use crate::scorer::loader::NgramTable;
use crate::scorer::Score;

/// Sum of n-gram weights over every window of the candidate.
#[inline]
pub fn score_ngrams(table: &NgramTable, plaintext: &[u8]) -> Score {
    let order = table.order();
    if plaintext.len() < order {
        return 0;
    }

    let radix = table.radix();
    // Weight of the leading symbol once the window is full.
    let lead = radix.pow(order as u32 - 1);

    let mut idx = plaintext[..order - 1]
        .iter()
        .fold(0usize, |acc, &s| acc * radix + s as usize);

    let mut sum: Score = 0;
    for &s in &plaintext[order - 1..] {
        idx = (idx % lead) * radix + s as usize;
        sum += table.weight(idx) as Score;
    }
    sum
}
