use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use model_viewer::math::Color;
use model_viewer::normalize::AssetNormalizer;
use model_viewer::scene::{Geometry, Material, SceneNode};
use model_viewer::SpinAnimator;
use std::sync::Arc;

/// Balanced tree of groups with `leaves` meshes under each bottom group,
/// alternating flat and standard materials
fn generate_tree(depth: usize, fan_out: usize, leaves: usize) -> SceneNode {
    let geometry = Arc::new(Geometry::cuboid(1.0, 1.0, 1.0));
    let flat = Arc::new(Material::phong(Color::RED));
    let standard = Arc::new(Material::standard(Color::WHITE, 0.4, 0.1));
    build(depth, fan_out, leaves, &geometry, &flat, &standard)
}

fn build(
    depth: usize,
    fan_out: usize,
    leaves: usize,
    geometry: &Arc<Geometry>,
    flat: &Arc<Material>,
    standard: &Arc<Material>,
) -> SceneNode {
    let mut node = SceneNode::group(format!("group{}", depth));
    if depth == 0 {
        for i in 0..leaves {
            let material = if i % 2 == 0 { flat } else { standard };
            node.children
                .push(SceneNode::mesh(geometry.clone(), Some(material.clone())));
        }
    } else {
        for _ in 0..fan_out {
            node.children
                .push(build(depth - 1, fan_out, leaves, geometry, flat, standard));
        }
    }
    node
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_tree");
    let normalizer = AssetNormalizer::default();

    for depth in [2usize, 4, 6].iter() {
        let tree = generate_tree(*depth, 4, 8);
        println!("depth {}: {} nodes, {} meshes", depth, tree.node_count(), tree.mesh_count());

        group.bench_with_input(BenchmarkId::new("fresh", depth), depth, |b, _| {
            b.iter_batched(
                || tree.clone(),
                |mut root| {
                    black_box(normalizer.normalize_with_report(&mut root));
                    root
                },
                criterion::BatchSize::LargeInput,
            )
        });

        let mut normalized = tree.clone();
        normalizer.normalize(&mut normalized);
        group.bench_with_input(BenchmarkId::new("already_normalized", depth), depth, |b, _| {
            b.iter(|| black_box(normalizer.normalize_with_report(&mut normalized)))
        });
    }

    group.finish();
}

fn bench_spin(c: &mut Criterion) {
    let mut animator = SpinAnimator::default();
    let mut root = generate_tree(4, 4, 8);

    c.bench_function("spin_step", |b| {
        b.iter(|| animator.on_frame(Some(black_box(&mut root))))
    });
}

criterion_group!(benches, bench_normalize, bench_spin);
criterion_main!(benches);
