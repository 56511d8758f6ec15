pub use vecmat::Vector;

/// A position, direction or color in 3D space.
pub type Vec3 = Vector<f32, 3>;

pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vector::from_array([x, y, z])
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    let [ax, ay, az] = a.into_array();
    let [bx, by, bz] = b.into_array();
    ax * bx + ay * by + az * bz
}

/// Linear blend between `a` and `b`. The weighted sum form guarantees that
/// `t = 0.0` returns `a` and `t = 1.0` returns `b` bit for bit.
pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Normalizes a vector. The zero vector has no direction and is returned as is.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length = v.length();
    if length > 0.0 {
        v / length
    } else {
        v
    }
}

/// Applies `f` to every component of the vector.
pub fn map3(v: Vec3, f: impl Fn(f32) -> f32) -> Vec3 {
    Vector::from_array(v.into_array().map(f))
}
