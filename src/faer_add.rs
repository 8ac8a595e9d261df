use crate::Float;
use faer::Mat;
use faer_core::{zipped, MatMut, MatRef};

// `size` points from `lower` to `upper`, both included
pub fn linspace(lower: Float, upper: Float, size: usize) -> Mat<Float> {
    let last = size.saturating_sub(1).max(1);
    let h = (upper - lower) / last as Float;
    Mat::<Float>::from_fn(size, 1, |i, _| {
        if i == last {
            upper
        } else {
            lower + h * i as Float
        }
    })
}

pub fn broadcast_to(f: impl Fn(Float) -> Float, m: MatRef<'_, Float>, out: MatMut<'_, Float>) {
    zipped!(out, m).for_each(|mut out_c, m_c| out_c.write(f(m_c.read())));
}

pub fn broadcast(f: impl Fn(Float) -> Float, m: MatRef<'_, Float>) -> Mat<Float> {
    let mut out = m.to_owned();
    broadcast_to(f, m, out.as_mut());
    out
}

pub fn column_from_slice(values: &[Float]) -> Mat<Float> {
    Mat::<Float>::from_fn(values.len(), 1, |i, _| values[i])
}

pub fn column_to_vec(m: MatRef<'_, Float>) -> Vec<Float> {
    (0..m.nrows()).map(|i| m.read(i, 0)).collect()
}
