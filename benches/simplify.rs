//! Benchmarks for mesh simplification.

use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use nalgebra::Point3;
use whittle::prelude::*;

/// Grid in the xy plane with a gentle height field, so collapses have cost.
fn create_grid_mesh(n: usize) -> Mesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            let (x, y) = (i as f64, j as f64);
            vertices.push(Point3::new(x, y, (x * 0.3).sin() * (y * 0.2).cos()));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    Mesh::from_triangles(&vertices, &faces).unwrap()
}

/// Subdivided octahedron projected onto the unit sphere.
fn create_sphere_mesh(levels: usize) -> Mesh {
    let mut vertices = vec![
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let mut faces = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];

    for _ in 0..levels {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);

        for [a, b, c] in faces {
            let mut midpoint = |u: usize, v: usize| {
                *midpoints.entry((u.min(v), u.max(v))).or_insert_with(|| {
                    let m = nalgebra::center(&vertices[u], &vertices[v]);
                    vertices.push(Point3::from(m.coords.normalize()));
                    vertices.len() - 1
                })
            };
            let ab = midpoint(a, b);
            let bc = midpoint(b, c);
            let ca = midpoint(c, a);

            next.push([a, ab, ca]);
            next.push([ab, b, bc]);
            next.push([ca, bc, c]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    Mesh::from_triangles(&vertices, &faces).unwrap()
}

fn bench_simplify_grid(c: &mut Criterion) {
    let mesh = create_grid_mesh(100);
    let target = mesh.num_triangles() / 10;

    c.bench_function("simplify_grid_100x100_to_10pct", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| mesh.simplify(target, 7.0),
            BatchSize::LargeInput,
        );
    });
}

fn bench_simplify_sphere(c: &mut Criterion) {
    let mesh = create_sphere_mesh(5);
    let options = SimplifyOptions::with_target_ratio(0.25);

    c.bench_function("simplify_sphere_8k_to_25pct", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| simplify(&mut mesh, &options),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_simplify_grid, bench_simplify_sphere);
criterion_main!(benches);
