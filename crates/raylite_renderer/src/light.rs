//! Point and area light sources.

use crate::object::RAY_EPSILON;
use rand::Rng;
use raylite_core::LightDesc;
use raylite_math::{Color, Ray, Vec3};

/// A light source. Area lights are parallelograms spanned by two edges
/// from a corner; they are sampled on a jittered grid and are visible to
/// camera and secondary rays.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Point {
        position: Vec3,
        color: Color,
        brightness: f32,
    },
    Area {
        corner: Vec3,
        edge_u: Vec3,
        edge_v: Vec3,
        color: Color,
        brightness: f32,
    },
}

impl Light {
    pub fn point(position: Vec3, color: Color, brightness: f32) -> Self {
        Light::Point {
            position,
            color,
            brightness,
        }
    }

    pub fn area(corner: Vec3, edge_u: Vec3, edge_v: Vec3, color: Color, brightness: f32) -> Self {
        Light::Area {
            corner,
            edge_u,
            edge_v,
            color,
            brightness,
        }
    }

    pub fn from_desc(desc: &LightDesc) -> Self {
        match *desc {
            LightDesc::Point {
                position,
                color,
                brightness,
            } => Light::point(position, color, brightness),
            LightDesc::Area {
                corner,
                edge_u,
                edge_v,
                color,
                brightness,
            } => Light::area(corner, edge_u, edge_v, color, brightness),
        }
    }

    /// Radiance leaving the light: color scaled by brightness.
    pub fn emission(&self) -> Color {
        match *self {
            Light::Point {
                color, brightness, ..
            }
            | Light::Area {
                color, brightness, ..
            } => color * brightness,
        }
    }

    /// Grid of shadow samples for a light-grid setting: a point light is a
    /// single sample, an area light `grid x grid`.
    pub fn sample_grid(&self, grid: u32) -> (u32, u32) {
        match self {
            Light::Point { .. } => (1, 1),
            Light::Area { .. } => {
                let n = grid.max(1);
                (n, n)
            }
        }
    }

    /// Sample position for cell `(i, j)` of a `cols x rows` grid.
    ///
    /// Point lights always return their position. Area lights return a
    /// point jittered uniformly inside the cell, so each cell is sampled
    /// once per shading point and the grid covers the whole light.
    pub fn point_on_light<R: Rng + ?Sized>(
        &self,
        i: u32,
        j: u32,
        cols: u32,
        rows: u32,
        rng: &mut R,
    ) -> Vec3 {
        match *self {
            Light::Point { position, .. } => position,
            Light::Area {
                corner,
                edge_u,
                edge_v,
                ..
            } => {
                let cols = cols.max(1) as f32;
                let rows = rows.max(1) as f32;
                let su = (i as f32 + rng.gen::<f32>()) / cols;
                let sv = (j as f32 + rng.gen::<f32>()) / rows;
                corner + edge_u * su + edge_v * sv
            }
        }
    }

    /// Distance along `ray` to the visible light surface, if any. Point
    /// lights have no surface and are never hit.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let Light::Area {
            corner,
            edge_u,
            edge_v,
            ..
        } = *self
        else {
            return None;
        };

        let n = edge_u.cross(edge_v);
        let n_dot_n = n.length_squared();
        let denom = n.dot(ray.direction);
        if n_dot_n == 0.0 || denom.abs() < 1e-8 {
            return None;
        }

        let t = n.dot(corner - ray.origin) / denom;
        if t <= RAY_EPSILON {
            return None;
        }

        let rel = ray.at(t) - corner;
        let a = rel.cross(edge_v).dot(n) / n_dot_n;
        let b = edge_u.cross(rel).dot(n) / n_dot_n;
        ((0.0..=1.0).contains(&a) && (0.0..=1.0).contains(&b)).then_some(t)
    }
}
