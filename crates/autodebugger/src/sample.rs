//! Demo buffer with an off-by-one bug for trying the debug loop.

use forge_backend::Language;

pub const SAMPLE_LANGUAGE: Language = Language::Python;

pub const SAMPLE_CODE: &str = r#"# Intentional bug: binary search reads past the end
def binary_search(arr, target):
    low = 0
    high = len(arr)  # Bug: upper bound is off by one

    while low <= high:
        mid = (low + high) // 2
        if arr[mid] == target:
            return mid
        elif arr[mid] < target:
            low = mid + 1
        else:
            high = mid - 1

    return -1

numbers = [1, 3, 5, 7, 9, 11]
print(f"Index of 9 is: {binary_search(numbers, 9)}")
print(f"Index of 12 is: {binary_search(numbers, 12)}")
"#;
