//! Built-in targets.
//!
//! Every function returns a checksum derived from its work so the optimizer
//! cannot drop the loop.

use crate::domain::ModelKind;
use crate::targets::{Module, Target, TargetError};

/// `2ⁿ` work becomes impractical quickly; larger inputs are refused.
pub const EXPONENTIAL_MAX_LEN: usize = 24;

pub static MODULES: &[Module] = &[
    Module {
        name: "growth",
        summary: "synthetic workloads, one per growth model",
        targets: GROWTH,
    },
    Module {
        name: "sorting",
        summary: "sorting algorithms",
        targets: SORTING,
    },
];

const GROWTH: &[Target] = &[
    Target {
        name: "constant",
        summary: "reads the first element and the length",
        expected: ModelKind::Constant,
        run: constant,
    },
    Target {
        name: "logarithmic",
        summary: "binary search for one probe value",
        expected: ModelKind::Logarithmic,
        run: logarithmic,
    },
    Target {
        name: "linear",
        summary: "single pass over the input",
        expected: ModelKind::Linear,
        run: linear,
    },
    Target {
        name: "linearithmic",
        summary: "one binary search per element",
        expected: ModelKind::Linearithmic,
        run: linearithmic,
    },
    Target {
        name: "quadratic",
        summary: "visits every pair of elements",
        expected: ModelKind::Quadratic,
        run: quadratic,
    },
    Target {
        name: "cubic",
        summary: "visits every triple of elements",
        expected: ModelKind::Cubic,
        run: cubic,
    },
    Target {
        name: "exponential",
        summary: "enumerates every subset (refuses n > 24)",
        expected: ModelKind::Exponential,
        run: exponential,
    },
];

const SORTING: &[Target] = &[
    Target {
        name: "bubble_sort",
        summary: "bubble sort on a copy of the input",
        expected: ModelKind::Quadratic,
        run: bubble_sort,
    },
    Target {
        name: "insertion_sort",
        summary: "insertion sort on a copy of the input",
        expected: ModelKind::Quadratic,
        run: insertion_sort,
    },
    Target {
        name: "merge_sort",
        summary: "top-down merge sort",
        expected: ModelKind::Linearithmic,
        run: merge_sort,
    },
    Target {
        name: "std_sort",
        summary: "slice::sort (stable)",
        expected: ModelKind::Linearithmic,
        run: std_sort,
    },
    Target {
        name: "std_sort_unstable",
        summary: "slice::sort_unstable",
        expected: ModelKind::Linearithmic,
        run: std_sort_unstable,
    },
];

fn constant(input: &[u64]) -> Result<u64, TargetError> {
    Ok(input.first().copied().unwrap_or(0) ^ input.len() as u64)
}

fn logarithmic(input: &[u64]) -> Result<u64, TargetError> {
    let probe = input.len() as u64 / 3;
    Ok(input.partition_point(|&x| x < probe) as u64)
}

fn linear(input: &[u64]) -> Result<u64, TargetError> {
    Ok(input
        .iter()
        .fold(0u64, |acc, &x| acc.wrapping_mul(31).wrapping_add(x)))
}

fn linearithmic(input: &[u64]) -> Result<u64, TargetError> {
    Ok(input.iter().fold(0u64, |acc, &x| {
        acc.wrapping_add(input.partition_point(|&y| y < x) as u64)
    }))
}

fn quadratic(input: &[u64]) -> Result<u64, TargetError> {
    let mut acc = 0u64;
    for &a in input {
        for &b in input {
            acc = acc.wrapping_add(a ^ b);
        }
    }
    Ok(acc)
}

fn cubic(input: &[u64]) -> Result<u64, TargetError> {
    let mut acc = 0u64;
    for &a in input {
        for &b in input {
            for &c in input {
                acc = acc.wrapping_add((a ^ b).wrapping_mul(c | 1));
            }
        }
    }
    Ok(acc)
}

fn exponential(input: &[u64]) -> Result<u64, TargetError> {
    if input.len() > EXPONENTIAL_MAX_LEN {
        return Err(TargetError(format!(
            "input of length {} exceeds the limit of {EXPONENTIAL_MAX_LEN}",
            input.len()
        )));
    }
    Ok(even_subset_sums(input, 0))
}

/// Number of subsets of `values` whose sum (plus `acc`) is even.
fn even_subset_sums(values: &[u64], acc: u64) -> u64 {
    match values.split_first() {
        None => u64::from(acc % 2 == 0),
        Some((&head, rest)) => {
            even_subset_sums(rest, acc) + even_subset_sums(rest, acc.wrapping_add(head))
        }
    }
}

fn bubble_sort(input: &[u64]) -> Result<u64, TargetError> {
    let mut v = input.to_vec();
    let n = v.len();
    for i in 0..n {
        let mut swapped = false;
        for j in 0..n - 1 - i {
            if v[j] > v[j + 1] {
                v.swap(j, j + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
    Ok(checksum(&v))
}

fn insertion_sort(input: &[u64]) -> Result<u64, TargetError> {
    let mut v = input.to_vec();
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && v[j - 1] > v[j] {
            v.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(checksum(&v))
}

fn merge_sort(input: &[u64]) -> Result<u64, TargetError> {
    let mut v = input.to_vec();
    let mut buf = vec![0u64; v.len()];
    merge_sort_into(&mut v, &mut buf);
    Ok(checksum(&v))
}

fn merge_sort_into(v: &mut [u64], buf: &mut [u64]) {
    let n = v.len();
    if n <= 1 {
        return;
    }
    let mid = n / 2;
    {
        let (left, right) = v.split_at_mut(mid);
        let (buf_left, buf_right) = buf.split_at_mut(mid);
        merge_sort_into(left, buf_left);
        merge_sort_into(right, buf_right);
    }

    let (mut i, mut j) = (0, mid);
    for slot in buf.iter_mut().take(n) {
        if j >= n || (i < mid && v[i] <= v[j]) {
            *slot = v[i];
            i += 1;
        } else {
            *slot = v[j];
            j += 1;
        }
    }
    v.copy_from_slice(&buf[..n]);
}

fn std_sort(input: &[u64]) -> Result<u64, TargetError> {
    let mut v = input.to_vec();
    v.sort();
    Ok(checksum(&v))
}

fn std_sort_unstable(input: &[u64]) -> Result<u64, TargetError> {
    let mut v = input.to_vec();
    v.sort_unstable();
    Ok(checksum(&v))
}

/// Position-weighted sum; equal for equal sorted outputs.
fn checksum(v: &[u64]) -> u64 {
    v.iter()
        .enumerate()
        .fold(0u64, |acc, (i, &x)| acc.wrapping_add((i as u64 + 1).wrapping_mul(x)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InputKind;
    use crate::harness::generate_input;

    #[test]
    fn sorting_targets_agree() {
        let input = generate_input(InputKind::Shuffled, 257, 3);
        let mut sorted = input.clone();
        sorted.sort_unstable();
        let expected = checksum(&sorted);

        for t in SORTING {
            assert_eq!(t.call(&input).unwrap(), expected, "{}", t.name);
        }
    }

    #[test]
    fn sorting_handles_tiny_inputs() {
        for t in SORTING {
            assert_eq!(t.call(&[]).unwrap(), 0, "{}", t.name);
            assert_eq!(t.call(&[5]).unwrap(), 5, "{}", t.name);
        }
    }

    #[test]
    fn exponential_counts_even_subsets_and_refuses_large_inputs() {
        // Any non-empty set with an odd element has exactly half its subsets even.
        assert_eq!(exponential(&[1, 2, 3]).unwrap(), 4);
        assert_eq!(exponential(&[]).unwrap(), 1);

        let big = vec![0u64; EXPONENTIAL_MAX_LEN + 1];
        let err = exponential(&big).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"));
    }

    #[test]
    fn growth_targets_run_on_every_input_kind() {
        for kind in [InputKind::Ascending, InputKind::Random] {
            let input = generate_input(kind, 12, 1);
            for t in GROWTH {
                assert!(t.call(&input).is_ok(), "{}", t.name);
            }
        }
        assert_eq!(logarithmic(&[0, 1, 2, 3, 4, 5]).unwrap(), 2);
    }
}
