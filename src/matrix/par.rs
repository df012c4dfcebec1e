/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

// Row distribution for the products.
//
// With rayon-support each output row is a work item on the global pool.
// Without it, the same closure runs over the rows in order, so results
// are identical either way.

#[cfg(feature = "rayon-support")]
use ::rayon::prelude::*;

/// Call `f(i, row)` for every `width`-long row of `data`.
pub(crate) fn for_each_row<T, F>(data: &mut [T], width: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    // chunks of length zero are not a thing
    if width == 0 {
        return;
    }
    debug_assert_eq!(data.len() % width, 0);

    #[cfg(feature = "rayon-support")]
    data.par_chunks_mut(width).enumerate().for_each(|(i, row)| f(i, row));

    #[cfg(not(feature = "rayon-support"))]
    data.chunks_mut(width).enumerate().for_each(|(i, row)| f(i, row));
}

/// Call `f(i, x)` for every element of `data`.
pub(crate) fn for_each_element<T, F>(data: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(feature = "rayon-support")]
    data.par_iter_mut().enumerate().for_each(|(i, x)| f(i, x));

    #[cfg(not(feature = "rayon-support"))]
    data.iter_mut().enumerate().for_each(|(i, x)| f(i, x));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_each_row_once() {
        let mut data = vec![0u32; 12];
        for_each_row(&mut data, 3, |i, row| {
            for x in row {
                *x += i as u32 + 1;
            }
        });
        assert_eq!(data, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn zero_width_is_a_no_op() {
        let mut data: Vec<u32> = vec![];
        for_each_row(&mut data, 0, |_, _| panic!("called"));
    }

    #[test]
    fn visits_each_element_once() {
        let mut data = vec![10u64; 5];
        for_each_element(&mut data, |i, x| *x += i as u64);
        assert_eq!(data, vec![10, 11, 12, 13, 14]);
    }
}
