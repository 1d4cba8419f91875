use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::UVec3;

use svo_index::voxel::color::pack_rgb;
use svo_index::voxel::svo::Octree;
use svo_index::voxel::test_scene::generate_test_scene;

/// Solid sphere of voxels centered in a `2^depth` grid
fn fill_sphere(octree: &mut Octree, radius: f32) {
    let size = octree.grid_size();
    let center = size as f32 / 2.0;

    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - center + 0.5;
                let dy = y as f32 - center + 0.5;
                let dz = z as f32 - center + 0.5;
                if (dx * dx + dy * dy + dz * dz).sqrt() <= radius {
                    let r = ((x as f32 / size as f32) * 255.0) as u8;
                    let g = ((y as f32 / size as f32) * 255.0) as u8;
                    octree.insert_voxel(UVec3::new(x, y, z), pack_rgb(r, g, 128));
                }
            }
        }
    }
}

fn bench_insert_sphere_64(c: &mut Criterion) {
    c.bench_function("insert_sphere_64", |b| {
        b.iter(|| {
            let mut octree = Octree::new(black_box(6));
            fill_sphere(&mut octree, 28.0);
            octree
        });
    });
}

fn bench_compress_sphere_64(c: &mut Criterion) {
    let mut source = Octree::new(6);
    fill_sphere(&mut source, 28.0);

    c.bench_function("compress_sphere_64", |b| {
        b.iter(|| {
            let mut octree = source.clone();
            black_box(octree.compress())
        });
    });
}

fn bench_test_scene(c: &mut Criterion) {
    c.bench_function("test_scene_depth_8", |b| {
        b.iter(|| {
            let mut octree = Octree::new(black_box(8));
            generate_test_scene(&mut octree);
            octree.compress();
            octree
        });
    });
}

criterion_group!(benches, bench_insert_sphere_64, bench_compress_sphere_64, bench_test_scene);
criterion_main!(benches);
